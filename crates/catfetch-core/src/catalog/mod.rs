//! Catalog client: the relational store of download tasks and the stored
//! procedure that refreshes it.
//!
//! The job only ever needs two things from the catalog, so the seam is the
//! narrow [`Catalog`] trait. [`SqlCatalog`] implements it over any sqlx
//! driver; `crate::testing::MockCatalog` implements it in memory.

mod error;
mod sql;
mod types;

pub use error::CatalogError;
pub use sql::{SqlCatalog, TASK_TABLE};
pub use types::{DownloadTask, TaskKind, TaskMode};

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy, finite, single-pass sequence of task rows in the catalog's own order.
pub type TaskStream<'a> = BoxStream<'a, Result<DownloadTask, CatalogError>>;

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Display name for logs.
    fn name(&self) -> &str;

    /// Invoke a stored routine that takes no arguments.
    async fn execute_procedure(&self, name: &str) -> Result<(), CatalogError>;

    /// Stream the task rows for `mode`.
    ///
    /// Row-local problems come through as [`CatalogError::InvalidRow`] items
    /// and the stream goes on; any other error item means the query failed.
    fn query_tasks(&self, mode: TaskMode) -> TaskStream<'_>;
}
