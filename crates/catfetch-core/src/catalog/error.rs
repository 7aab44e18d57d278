use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to connect to catalog {name}: {source}")]
    Connect {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("stored procedure {name} failed: {source}")]
    Procedure {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("task query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("invalid task row (sqno {sequence_id:?}): {reason}")]
    InvalidRow {
        sequence_id: Option<i64>,
        reason: String,
    },

    #[error("no catalog configured for this run")]
    NotConfigured,
}

impl CatalogError {
    /// True for problems confined to a single row; the batch may go on.
    pub fn is_row_local(&self) -> bool {
        matches!(self, CatalogError::InvalidRow { .. })
    }
}
