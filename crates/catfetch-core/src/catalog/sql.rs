//! Catalog over an sqlx `Any` pool (Postgres, MySQL or SQLite by URL).

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};

use super::error::CatalogError;
use super::types::{DownloadTask, TaskMode};
use super::{Catalog, TaskStream};
use crate::config::CatalogSettings;

/// Table holding one row per download task.
pub const TASK_TABLE: &str = "ftpgetdemo";

const DIRECTORY_PROJECTION: &str = "SELECT sqno, remotepath, localpath FROM ftpgetdemo";
const FILE_PROJECTION: &str = "SELECT sqno, remotepath, remotefile, localpath FROM ftpgetdemo";

/// Handle to the relational catalog.
///
/// The job uses a single connection: the procedure call and the task query
/// run one after the other and nothing else touches the pool.
#[derive(Clone)]
pub struct SqlCatalog {
    pool: AnyPool,
    name: String,
}

impl SqlCatalog {
    /// Build the pool without connecting. An unreachable catalog is reported
    /// by the first operation, inside the refresh stage, not here.
    pub fn connect_lazy(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&settings.url)
            .map_err(|source| CatalogError::Connect {
                name: settings.alias.clone(),
                source,
            })?;
        Ok(Self {
            pool,
            name: settings.alias.clone(),
        })
    }

    /// Connect eagerly. Used by tools and tests that seed the catalog first.
    pub async fn connect(url: &str, name: impl Into<String>) -> Result<Self, CatalogError> {
        sqlx::any::install_default_drivers();
        let name = name.into();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|source| CatalogError::Connect {
                name: name.clone(),
                source,
            })?;
        Ok(Self { pool, name })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    fn procedure_error(&self, name: &str, source: sqlx::Error) -> CatalogError {
        match source {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Configuration(_) => CatalogError::Connect {
                name: self.name.clone(),
                source,
            },
            source => CatalogError::Procedure {
                name: name.to_string(),
                source,
            },
        }
    }
}

#[async_trait]
impl Catalog for SqlCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute_procedure(&self, name: &str) -> Result<(), CatalogError> {
        let sql = format!("CALL {name}()");
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|source| self.procedure_error(name, source))?;
        Ok(())
    }

    fn query_tasks(&self, mode: TaskMode) -> TaskStream<'_> {
        let sql = match mode {
            TaskMode::WholeDirectory => DIRECTORY_PROJECTION,
            TaskMode::SingleFile => FILE_PROJECTION,
        };
        tracing::debug!(sql, "querying task rows");

        sqlx::query(sql)
            .fetch(&self.pool)
            .map(move |row| match row {
                Ok(row) => task_from_row(&row, mode),
                Err(source) => Err(CatalogError::Query(source)),
            })
            .boxed()
    }
}

/// Decode one row by column position, following the projection for `mode`.
fn task_from_row(row: &AnyRow, mode: TaskMode) -> Result<DownloadTask, CatalogError> {
    let sequence_id: i64 = row.try_get(0).map_err(|e| CatalogError::InvalidRow {
        sequence_id: None,
        reason: format!("sqno: {e}"),
    })?;
    let bad = |column: &str, e: sqlx::Error| CatalogError::InvalidRow {
        sequence_id: Some(sequence_id),
        reason: format!("{column}: {e}"),
    };

    let remote_path: String = row.try_get(1).map_err(|e| bad("remotepath", e))?;
    match mode {
        TaskMode::WholeDirectory => {
            let local_path: String = row.try_get(2).map_err(|e| bad("localpath", e))?;
            Ok(DownloadTask::directory(sequence_id, remote_path, local_path))
        }
        TaskMode::SingleFile => {
            let file_name: Option<String> = row.try_get(2).map_err(|e| bad("remotefile", e))?;
            let local_path: String = row.try_get(3).map_err(|e| bad("localpath", e))?;
            match file_name.filter(|f| !f.is_empty()) {
                Some(file_name) => Ok(DownloadTask::file(
                    sequence_id,
                    remote_path,
                    file_name,
                    local_path,
                )),
                None => Err(CatalogError::InvalidRow {
                    sequence_id: Some(sequence_id),
                    reason: "remotefile is empty in single-file mode".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    /// In-memory SQLite catalog with the task table and three rows.
    async fn open_memory() -> SqlCatalog {
        // Single connection so every query sees the same in-memory database.
        let catalog = SqlCatalog::connect("sqlite::memory:", "memory")
            .await
            .unwrap();
        for sql in [
            "CREATE TABLE ftpgetdemo (
                sqno INTEGER PRIMARY KEY,
                remotepath TEXT NOT NULL,
                remotefile TEXT,
                localpath TEXT NOT NULL
            )",
            "INSERT INTO ftpgetdemo VALUES (1, '/out/a', 'a.csv', '/data/a')",
            "INSERT INTO ftpgetdemo VALUES (2, '/out/b', NULL, '/data/b')",
            "INSERT INTO ftpgetdemo VALUES (3, '/out/c', 'c.csv', '/data/c')",
        ] {
            sqlx::query(sql).execute(catalog.pool()).await.unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn directory_projection_ignores_remotefile() {
        let catalog = open_memory().await;
        let mut tasks: Vec<DownloadTask> = catalog
            .query_tasks(TaskMode::WholeDirectory)
            .try_collect()
            .await
            .unwrap();
        tasks.sort_by_key(|t| t.sequence_id);
        assert_eq!(
            tasks,
            vec![
                DownloadTask::directory(1, "/out/a", "/data/a"),
                DownloadTask::directory(2, "/out/b", "/data/b"),
                DownloadTask::directory(3, "/out/c", "/data/c"),
            ]
        );
    }

    #[tokio::test]
    async fn file_projection_flags_rows_without_file_name() {
        let catalog = open_memory().await;
        let items: Vec<_> = catalog.query_tasks(TaskMode::SingleFile).collect().await;
        assert_eq!(items.len(), 3);

        let mut ok: Vec<DownloadTask> = items
            .iter()
            .filter_map(|r| r.as_ref().ok().cloned())
            .collect();
        ok.sort_by_key(|t| t.sequence_id);
        assert_eq!(
            ok,
            vec![
                DownloadTask::file(1, "/out/a", "a.csv", "/data/a"),
                DownloadTask::file(3, "/out/c", "c.csv", "/data/c"),
            ]
        );

        let bad: Vec<_> = items.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(bad.len(), 1);
        assert!(bad[0].is_row_local());
        assert!(matches!(
            bad[0],
            CatalogError::InvalidRow {
                sequence_id: Some(2),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn procedure_failure_is_reported() {
        // SQLite has no stored routines, so CALL fails at the catalog.
        let catalog = open_memory().await;
        let err = catalog.execute_procedure("refresh_tasks").await.unwrap_err();
        match err {
            CatalogError::Procedure { name, .. } => assert_eq!(name, "refresh_tasks"),
            other => panic!("expected Procedure error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_table_is_a_query_error() {
        let catalog = SqlCatalog::connect("sqlite::memory:", "empty").await.unwrap();
        let items: Vec<_> = catalog.query_tasks(TaskMode::WholeDirectory).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(CatalogError::Query(_))));
    }
}
