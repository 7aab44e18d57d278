use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use crate::catalog::{Catalog, CatalogError, DownloadTask, TaskMode, TaskStream};

enum MockRow {
    Task(DownloadTask),
    Invalid {
        sequence_id: Option<i64>,
        reason: String,
    },
    QueryFailure(String),
}

/// Catalog that replays a fixed list of rows and records what it was asked.
pub struct MockCatalog {
    name: String,
    rows: Vec<MockRow>,
    procedure_failure: Option<String>,
    procedures: Mutex<Vec<String>>,
    modes: Mutex<Vec<TaskMode>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            name: "mock-catalog".to_string(),
            rows: Vec::new(),
            procedure_failure: None,
            procedures: Mutex::new(Vec::new()),
            modes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_task(mut self, task: DownloadTask) -> Self {
        self.rows.push(MockRow::Task(task));
        self
    }

    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = DownloadTask>) -> Self {
        self.rows.extend(tasks.into_iter().map(MockRow::Task));
        self
    }

    pub fn with_invalid_row(mut self, sequence_id: Option<i64>, reason: &str) -> Self {
        self.rows.push(MockRow::Invalid {
            sequence_id,
            reason: reason.to_string(),
        });
        self
    }

    /// The stream fails at this point; later rows are never delivered.
    pub fn with_query_failure(mut self, message: &str) -> Self {
        self.rows.push(MockRow::QueryFailure(message.to_string()));
        self
    }

    pub fn failing_procedure(mut self, message: &str) -> Self {
        self.procedure_failure = Some(message.to_string());
        self
    }

    pub fn executed_procedures(&self) -> Vec<String> {
        self.procedures.lock().unwrap().clone()
    }

    pub fn queried_modes(&self) -> Vec<TaskMode> {
        self.modes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute_procedure(&self, name: &str) -> Result<(), CatalogError> {
        self.procedures.lock().unwrap().push(name.to_string());
        match &self.procedure_failure {
            Some(message) => Err(CatalogError::Procedure {
                name: name.to_string(),
                source: sqlx::Error::Protocol(message.clone()),
            }),
            None => Ok(()),
        }
    }

    fn query_tasks(&self, mode: TaskMode) -> TaskStream<'_> {
        self.modes.lock().unwrap().push(mode);

        let mut items = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row {
                MockRow::Task(task) => items.push(Ok(task.clone())),
                MockRow::Invalid {
                    sequence_id,
                    reason,
                } => items.push(Err(CatalogError::InvalidRow {
                    sequence_id: *sequence_id,
                    reason: reason.clone(),
                })),
                MockRow::QueryFailure(message) => {
                    items.push(Err(CatalogError::Query(sqlx::Error::Protocol(
                        message.clone(),
                    ))));
                    break;
                }
            }
        }
        futures::stream::iter(items).boxed()
    }
}
