//! Download dispatcher: walks the task rows in catalog order and runs one
//! transfer per row, strictly one after another.
//!
//! A failed task is logged and recorded; the batch always moves on to the
//! next row. Only a failure of the query itself ends the batch early.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, DownloadTask, TaskMode};
use crate::config::TransferSettings;
use crate::stamp;
use crate::transfer::{build_args, TransferClient, TransferError};

/// Why one task did not complete.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to create local directory {path}: {source}")]
    LocalDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    /// `None` when the row was too broken to yield its `sqno`.
    pub sequence_id: Option<i64>,
    pub reason: String,
}

/// Per-batch bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Rows received from the catalog, valid or not.
    pub rows: usize,
    /// Valid tasks for which a transfer was attempted.
    pub attempted: usize,
    pub succeeded: usize,
    /// Failed tasks and invalid rows, in the order they occurred.
    pub failures: Vec<TaskFailure>,
}

impl DispatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stream the tasks for `mode` and transfer each in turn.
pub async fn dispatch(
    catalog: &dyn Catalog,
    mode: TaskMode,
    transfer: &dyn TransferClient,
    settings: &TransferSettings,
) -> Result<DispatchReport, CatalogError> {
    tracing::info!(
        catalog = catalog.name(),
        mode = mode.as_str(),
        "retrieving remote {} for transfer",
        match mode {
            TaskMode::WholeDirectory => "paths",
            TaskMode::SingleFile => "files",
        }
    );

    let mut report = DispatchReport::default();
    let mut rows = catalog.query_tasks(mode);
    while let Some(row) = rows.next().await {
        report.rows += 1;
        let task = match row {
            Ok(task) => task,
            Err(err) if err.is_row_local() => {
                tracing::warn!("skipping task row: {}", err);
                let sequence_id = match &err {
                    CatalogError::InvalidRow { sequence_id, .. } => *sequence_id,
                    _ => None,
                };
                report.failures.push(TaskFailure {
                    sequence_id,
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => {
                tracing::error!(
                    attempted = report.attempted,
                    succeeded = report.succeeded,
                    "task query aborted: {}",
                    err
                );
                return Err(err);
            }
        };

        report.attempted += 1;
        match run_task(&task, transfer, settings).await {
            Ok(()) => {
                report.succeeded += 1;
                tracing::info!(sqno = task.sequence_id, "file(s) downloaded successfully");
            }
            Err(err) => {
                tracing::error!(sqno = task.sequence_id, "failed to download file(s): {}", err);
                report.failures.push(TaskFailure {
                    sequence_id: Some(task.sequence_id),
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        rows = report.rows,
        succeeded = report.succeeded,
        failed = report.failed(),
        "download batch finished"
    );
    Ok(report)
}

/// Prepare the destination and run the client once for `task`.
pub async fn run_task(
    task: &DownloadTask,
    transfer: &dyn TransferClient,
    settings: &TransferSettings,
) -> Result<(), TaskError> {
    match task.remote_file_name() {
        Some(file) => tracing::info!(
            sqno = task.sequence_id,
            remote_path = %task.remote_path,
            remote_file = file,
            local_path = %task.local_path,
            "task"
        ),
        None => tracing::info!(
            sqno = task.sequence_id,
            remote_path = %task.remote_path,
            local_path = %task.local_path,
            "task"
        ),
    }

    ensure_local_dir(Path::new(&task.local_path)).await?;

    let args = build_args(settings, task, &stamp::now());
    tracing::info!(command = %transfer.describe(&args), "starting transfer");
    let outcome = transfer.invoke(&args).await?;
    if !outcome.stdout.trim().is_empty() {
        tracing::debug!(sqno = task.sequence_id, "client output: {}", outcome.stdout.trim());
    }
    Ok(())
}

/// Create `path` recursively. An existing directory is fine.
async fn ensure_local_dir(path: &Path) -> Result<(), TaskError> {
    if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| TaskError::LocalDir {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), "created local directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalog, MockTransferClient};

    fn settings(log_dir: &Path) -> TransferSettings {
        TransferSettings {
            host: "files.internal".into(),
            username: "alice".into(),
            password: "pw".into(),
            client: PathBuf::from("ncftpget"),
            log_dir: log_dir.to_path_buf(),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn every_task_runs_in_order_and_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("nested/b");
        let catalog = MockCatalog::new()
            .with_task(DownloadTask::directory(1, "/out/a", a.to_string_lossy()))
            .with_task(DownloadTask::directory(2, "/out/b", b.to_string_lossy()));
        let client = MockTransferClient::new();

        let report = dispatch(&catalog, TaskMode::WholeDirectory, &client, &settings(dir.path()))
            .await
            .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert!(report.is_clean());
        assert!(a.is_dir() && b.is_dir());
        assert_eq!(client.remote_sources(), vec!["/out/a", "/out/b"]);
        assert_eq!(catalog.queried_modes(), vec![TaskMode::WholeDirectory]);
    }

    #[tokio::test]
    async fn failing_task_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().to_string_lossy().into_owned();
        let catalog = MockCatalog::new()
            .with_task(DownloadTask::file(1, "/out", "one.csv", local.clone()))
            .with_task(DownloadTask::file(2, "/out", "two.csv", local.clone()))
            .with_task(DownloadTask::file(3, "/out", "three.csv", local.clone()))
            .with_task(DownloadTask::file(4, "/out", "four.csv", local));
        let client = MockTransferClient::new().fail_remote("/out/two.csv", 5);

        let report = dispatch(&catalog, TaskMode::SingleFile, &client, &settings(dir.path()))
            .await
            .unwrap();

        assert_eq!(report.attempted, 4);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sequence_id, Some(2));
        assert!(report.failures[0].reason.contains("exit code 5"));
        assert_eq!(
            client.remote_sources(),
            vec!["/out/one.csv", "/out/two.csv", "/out/three.csv", "/out/four.csv"]
        );
    }

    #[tokio::test]
    async fn invalid_row_is_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().to_string_lossy().into_owned();
        let catalog = MockCatalog::new()
            .with_invalid_row(Some(1), "remotefile is empty in single-file mode")
            .with_task(DownloadTask::file(2, "/out", "b.csv", local));
        let client = MockTransferClient::new();

        let report = dispatch(&catalog, TaskMode::SingleFile, &client, &settings(dir.path()))
            .await
            .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failures[0].sequence_id, Some(1));
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn unusable_local_path_fails_only_that_task() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let catalog = MockCatalog::new()
            .with_task(DownloadTask::directory(
                1,
                "/out/a",
                blocker.join("sub").to_string_lossy(),
            ))
            .with_task(DownloadTask::directory(2, "/out/b", dir.path().to_string_lossy()));
        let client = MockTransferClient::new();

        let report = dispatch(&catalog, TaskMode::WholeDirectory, &client, &settings(dir.path()))
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("local directory"));
        assert_eq!(client.remote_sources(), vec!["/out/b"]);
    }

    #[tokio::test]
    async fn query_failure_ends_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = MockCatalog::new()
            .with_task(DownloadTask::directory(1, "/out/a", dir.path().to_string_lossy()))
            .with_query_failure("connection reset");
        let client = MockTransferClient::new();

        let err = dispatch(&catalog, TaskMode::WholeDirectory, &client, &settings(dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Query(_)));
        assert_eq!(client.calls().len(), 1);
    }
}
