//! Filesystem stages: archiving the download tree and pruning old logs.
//!
//! Both are synchronous tree walks; the job runs them in sequence and waits.

mod archive;
mod error;
mod retention;

pub use archive::{archive, copy_tree, remove_tree, trees_overlap, ArchiveReport};
pub use error::{FsError, FsResult};
pub use retention::{prune, prune_at, PruneReport};
