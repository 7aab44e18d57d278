//! Move a tree by copy-then-delete, so source and destination may live on
//! different volumes.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::error::{FsError, FsResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// Directories mirrored below the destination root.
    pub directories: usize,
    pub files: usize,
    /// Entries deleted from the source, root included.
    pub removed: usize,
}

/// Copy `source` into `destination`, then delete `source`.
///
/// A copy failure returns before anything is deleted, leaving the source
/// intact. A delete failure leaves the copies in place; running again is
/// safe because copies overwrite and deletion picks up what is left.
///
/// Trees that contain one another are refused before anything is touched.
pub fn archive(source: &Path, destination: &Path) -> FsResult<ArchiveReport> {
    if trees_overlap(source, destination) {
        return Err(FsError::Overlap {
            source_root: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    tracing::info!(
        "copying files from {} to {}",
        source.display(),
        destination.display()
    );
    let (directories, files) = copy_tree(source, destination)?;

    tracing::info!("deleting files from {}", source.display());
    let removed = remove_tree(source)?;

    Ok(ArchiveReport {
        directories,
        files,
        removed,
    })
}

/// True if `a` and `b` are the same directory or one lies inside the other.
///
/// The longest existing ancestor of each path is canonicalized, so symlinks
/// and `..` resolve as the OS sees them; the not-yet-created rest is
/// compared lexically.
pub fn trees_overlap(a: &Path, b: &Path) -> bool {
    let (a, b) = (resolve(a), resolve(b));
    a.starts_with(&b) || b.starts_with(&a)
}

fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(real) = existing.canonicalize() {
            let mut resolved = real;
            resolved.extend(missing.iter().rev());
            return normalize(&resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return normalize(&absolute),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Mirror every directory and file of `source` under `destination`,
/// overwriting files that already exist there. Returns
/// `(subdirectories, files)` copied.
pub fn copy_tree(source: &Path, destination: &Path) -> FsResult<(usize, usize)> {
    let mut directories = 0;
    let mut files = 0;

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| FsError::walk("archive.copy.walk", source, e))?;
        let relative = entry.path().strip_prefix(source).map_err(|_| {
            FsError::io(
                "archive.copy.relativize",
                entry.path(),
                io::Error::new(io::ErrorKind::InvalidInput, "entry outside source tree"),
            )
        })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            if !target.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| FsError::io("archive.copy.create_dir", &target, e))?;
            }
            if entry.depth() > 0 {
                directories += 1;
            }
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|e| FsError::io("archive.copy.file", &target, e))?;
            files += 1;
        }
    }

    Ok((directories, files))
}

/// Delete `root` and everything below it: files first, then each emptied
/// directory, the root last. Returns the number of entries removed.
pub fn remove_tree(root: &Path) -> FsResult<usize> {
    let entries = WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FsError::walk("archive.delete.walk", root, e))?;

    for entry in &entries {
        let path = entry.path();
        if entry.file_type().is_dir() {
            fs::remove_dir(path).map_err(|e| FsError::io("archive.delete.dir", path, e))?;
        } else {
            fs::remove_file(path).map_err(|e| FsError::io("archive.delete.file", path, e))?;
        }
    }

    Ok(entries.len())
}
