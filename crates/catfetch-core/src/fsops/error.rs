use std::path::{Path, PathBuf};
use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

/// Filesystem failure tagged with the step that hit it.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{op} could not walk {path}: {source}")]
    Walk {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("archive destination {destination} overlaps source {source_root}")]
    Overlap {
        source_root: PathBuf,
        destination: PathBuf,
    },
}

impl FsError {
    pub(crate) fn io(op: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Walk errors name the entry that failed when walkdir knows it.
    pub(crate) fn walk(op: &'static str, root: &Path, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        Self::Walk { op, path, source }
    }

    pub fn path(&self) -> &Path {
        match self {
            FsError::Io { path, .. } | FsError::Walk { path, .. } => path,
            FsError::Overlap { destination, .. } => destination,
        }
    }
}
