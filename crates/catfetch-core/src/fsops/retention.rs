//! Age-based log pruning.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};
use walkdir::WalkDir;

use super::error::{FsError, FsResult};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Default, Serialize)]
pub struct PruneReport {
    /// Files looked at.
    pub scanned: usize,
    pub deleted: Vec<PathBuf>,
    /// Subtrees that could not be walked and files that could not be
    /// inspected or removed. Siblings were still pruned.
    #[serde(serialize_with = "error_messages")]
    pub errors: Vec<FsError>,
}

fn error_messages<S: Serializer>(errors: &[FsError], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(errors.iter().map(ToString::to_string))
}

/// Delete files below `dir` last modified more than `max_age_days` ago.
pub fn prune(dir: &Path, max_age_days: u64) -> FsResult<PruneReport> {
    prune_at(dir, max_age_days, SystemTime::now())
}

/// [`prune`] against a fixed clock. A file goes iff its mtime is strictly
/// before `now - max_age_days`. Directories are never removed, even empty.
///
/// Fails only when `dir` itself cannot be walked.
pub fn prune_at(dir: &Path, max_age_days: u64, now: SystemTime) -> FsResult<PruneReport> {
    let threshold = now
        .checked_sub(Duration::from_secs(max_age_days.saturating_mul(SECS_PER_DAY)))
        .unwrap_or(UNIX_EPOCH);
    let mut report = PruneReport::default();

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(FsError::walk("retention.walk", dir, e)),
            Err(e) => {
                let err = FsError::walk("retention.walk", dir, e);
                tracing::warn!("skipping subtree: {}", err);
                report.errors.push(err);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        report.scanned += 1;

        let path = entry.path();
        let modified = entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|meta| meta.modified());
        let modified = match modified {
            Ok(t) => t,
            Err(e) => {
                let err = FsError::io("retention.stat", path, e);
                tracing::warn!("{}", err);
                report.errors.push(err);
                continue;
            }
        };

        if modified < threshold {
            match fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!("deleted old log file: {}", path.display());
                    report.deleted.push(path.to_path_buf());
                }
                Err(e) => {
                    let err = FsError::io("retention.delete", path, e);
                    tracing::warn!("{}", err);
                    report.errors.push(err);
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(SECS_PER_DAY);

    /// Whole-second clock so filesystems with coarse mtimes keep exact ages.
    fn whole_second_now() -> SystemTime {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn file_aged(path: &Path, now: SystemTime, age: Duration) {
        fs::write(path, b"log line\n").unwrap();
        let f = fs::File::options().write(true).open(path).unwrap();
        f.set_modified(now - age).unwrap();
    }

    #[test]
    fn only_files_older_than_threshold_go() {
        let tmp = tempfile::tempdir().unwrap();
        let now = whole_second_now();
        let younger = tmp.path().join("29d.log");
        let exact = tmp.path().join("30d.log");
        let older = tmp.path().join("31d.log");
        file_aged(&younger, now, DAY * 29);
        file_aged(&exact, now, DAY * 30);
        file_aged(&older, now, DAY * 31);

        let report = prune_at(tmp.path(), 30, now).unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.deleted, vec![older.clone()]);
        assert!(report.errors.is_empty());
        assert!(younger.exists());
        assert!(exact.exists());
        assert!(!older.exists());
    }

    #[test]
    fn walks_subdirectories_and_keeps_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let now = whole_second_now();
        let nested = tmp.path().join("2023/03");
        let empty = tmp.path().join("empty");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(&empty).unwrap();
        let old = nested.join("old.log");
        file_aged(&old, now, DAY * 90);

        let report = prune_at(tmp.path(), 30, now).unwrap();

        assert_eq!(report.deleted, vec![old.clone()]);
        assert!(!old.exists());
        assert!(nested.is_dir());
        assert!(empty.is_dir());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = prune(&tmp.path().join("absent"), 30).unwrap_err();
        assert!(matches!(err, FsError::Walk { .. }));
    }

    #[test]
    fn report_serializes_errors_as_text() {
        let report = PruneReport {
            scanned: 1,
            deleted: vec![],
            errors: vec![FsError::io(
                "retention.delete",
                "/logs/x.log",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            )],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["errors"][0],
            "retention.delete failed for /logs/x.log: denied"
        );
    }
}
