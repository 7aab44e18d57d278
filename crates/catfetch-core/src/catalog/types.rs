//! Download task rows.

use serde::Serialize;

/// Which projection of the task table a run uses (`use.remote.path`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    /// Fetch `remotepath/remotefile` into `localpath`.
    SingleFile,
    /// Fetch the whole `remotepath` tree into `localpath`.
    WholeDirectory,
}

impl TaskMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskMode::SingleFile => "single-file",
            TaskMode::WholeDirectory => "whole-directory",
        }
    }
}

/// What a task fetches. The file name exists exactly when the task is a
/// single-file fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    WholeDirectory,
    SingleFile { file_name: String },
}

/// One catalog row. Built fresh per row and dropped after its transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// `sqno`, kept for traceability in logs.
    pub sequence_id: i64,
    pub remote_path: String,
    pub kind: TaskKind,
    /// Local destination directory.
    pub local_path: String,
}

impl DownloadTask {
    pub fn directory(
        sequence_id: i64,
        remote_path: impl Into<String>,
        local_path: impl Into<String>,
    ) -> Self {
        Self {
            sequence_id,
            remote_path: remote_path.into(),
            kind: TaskKind::WholeDirectory,
            local_path: local_path.into(),
        }
    }

    pub fn file(
        sequence_id: i64,
        remote_path: impl Into<String>,
        file_name: impl Into<String>,
        local_path: impl Into<String>,
    ) -> Self {
        Self {
            sequence_id,
            remote_path: remote_path.into(),
            kind: TaskKind::SingleFile {
                file_name: file_name.into(),
            },
            local_path: local_path.into(),
        }
    }

    pub fn mode(&self) -> TaskMode {
        match self.kind {
            TaskKind::WholeDirectory => TaskMode::WholeDirectory,
            TaskKind::SingleFile { .. } => TaskMode::SingleFile,
        }
    }

    pub fn remote_file_name(&self) -> Option<&str> {
        match &self.kind {
            TaskKind::SingleFile { file_name } => Some(file_name),
            TaskKind::WholeDirectory => None,
        }
    }

    /// Remote argument for the transfer client: the directory itself, or
    /// `remote_path + "/" + file_name`.
    pub fn remote_source(&self) -> String {
        match &self.kind {
            TaskKind::WholeDirectory => self.remote_path.clone(),
            TaskKind::SingleFile { file_name } => format!("{}/{}", self.remote_path, file_name),
        }
    }
}
