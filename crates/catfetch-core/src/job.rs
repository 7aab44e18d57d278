//! Job orchestrator.
//!
//! Runs the enabled stages in a fixed order: catalog refresh and download
//! dispatch, then archiving, then log retention. Each stage catches and
//! logs its own failure; a failed stage never stops the ones after it, and
//! no stage feeds another. Configuration problems are caught earlier, by
//! [`JobConfig::from_properties`], before a `Job` exists.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::config::JobConfig;
use crate::dispatch::{dispatch, DispatchReport};
use crate::fsops::{self, ArchiveReport, FsError, PruneReport};
use crate::transfer::TransferClient;

/// Log files older than this many days are pruned.
pub const LOG_RETENTION_DAYS: u64 = 30;

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("{0} not configured for this run")]
    NotConfigured(&'static str),
}

/// Result of one stage.
#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Skipped,
    Completed(T),
    Failed(String),
}

impl<T> StageOutcome<T> {
    fn from_result(stage: &str, result: Result<T, StageError>) -> Self {
        match result {
            Ok(value) => StageOutcome::Completed(value),
            Err(err) => {
                tracing::error!(stage, "stage failed: {}", err);
                StageOutcome::Failed(err.to_string())
            }
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            StageOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

#[derive(Debug, Serialize)]
pub struct JobReport {
    pub refresh: StageOutcome<DispatchReport>,
    pub archive: StageOutcome<ArchiveReport>,
    pub retention: StageOutcome<PruneReport>,
}

impl JobReport {
    /// Failed tasks and invalid rows of the dispatch stage.
    pub fn task_failures(&self) -> usize {
        self.refresh.completed().map_or(0, DispatchReport::failed)
    }

    /// True if a whole stage failed. Individual task failures don't count.
    pub fn any_stage_failed(&self) -> bool {
        self.refresh.is_failed() || self.archive.is_failed() || self.retention.is_failed()
    }

    /// One line per run for logs and the terminal.
    pub fn summary(&self) -> String {
        let refresh = match &self.refresh {
            StageOutcome::Skipped => "skipped".to_string(),
            StageOutcome::Completed(r) => format!(
                "{}/{} tasks ok, {} failed",
                r.succeeded,
                r.attempted,
                r.failed()
            ),
            StageOutcome::Failed(e) => format!("failed ({e})"),
        };
        let archive = match &self.archive {
            StageOutcome::Skipped => "skipped".to_string(),
            StageOutcome::Completed(r) => {
                format!("{} files, {} directories moved", r.files, r.directories)
            }
            StageOutcome::Failed(e) => format!("failed ({e})"),
        };
        let retention = match &self.retention {
            StageOutcome::Skipped => "skipped".to_string(),
            StageOutcome::Completed(r) => format!(
                "{} of {} files deleted, {} errors",
                r.deleted.len(),
                r.scanned,
                r.errors.len()
            ),
            StageOutcome::Failed(e) => format!("failed ({e})"),
        };
        format!("refresh: {refresh}; archive: {archive}; retention: {retention}")
    }
}

/// One run of the scheduled job over a validated configuration.
///
/// The catalog and transfer client are only consulted when the refresh
/// stage is enabled, so runs that only archive or prune need neither.
pub struct Job<'a> {
    config: &'a JobConfig,
    catalog: Option<&'a dyn Catalog>,
    transfer: Option<&'a dyn TransferClient>,
}

impl<'a> Job<'a> {
    pub fn new(config: &'a JobConfig) -> Self {
        Self {
            config,
            catalog: None,
            transfer: None,
        }
    }

    pub fn with_catalog(mut self, catalog: &'a dyn Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_transfer(mut self, transfer: &'a dyn TransferClient) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub async fn run(&self) -> JobReport {
        let stages = self.config.stages;
        tracing::info!(
            store = stages.store,
            move_files = stages.move_files,
            delete_logs = stages.delete_logs,
            "job starting"
        );

        let refresh = if stages.store {
            StageOutcome::from_result("refresh", self.refresh_and_dispatch().await)
        } else {
            tracing::debug!("catalog refresh disabled");
            StageOutcome::Skipped
        };

        let archive = if stages.move_files {
            StageOutcome::from_result("archive", self.archive())
        } else {
            tracing::debug!("archiving disabled");
            StageOutcome::Skipped
        };

        let retention = if stages.delete_logs {
            StageOutcome::from_result("retention", self.prune_logs())
        } else {
            tracing::debug!("log retention disabled");
            StageOutcome::Skipped
        };

        let report = JobReport {
            refresh,
            archive,
            retention,
        };
        tracing::info!("job finished: {}", report.summary());
        report
    }

    async fn refresh_and_dispatch(&self) -> Result<DispatchReport, StageError> {
        let settings = self
            .config
            .catalog
            .as_ref()
            .ok_or(StageError::NotConfigured("catalog settings"))?;
        let transfer_settings = self
            .config
            .transfer
            .as_ref()
            .ok_or(StageError::NotConfigured("transfer settings"))?;
        let catalog = self.catalog.ok_or(CatalogError::NotConfigured)?;
        let transfer = self
            .transfer
            .ok_or(StageError::NotConfigured("transfer client"))?;

        tracing::info!(
            "connecting to catalog [{}] and executing procedure {}",
            settings.alias,
            settings.procedure
        );
        catalog.execute_procedure(&settings.procedure).await?;
        tracing::info!("procedure executed successfully: {}", settings.procedure);

        Ok(dispatch(catalog, settings.mode, transfer, transfer_settings).await?)
    }

    fn archive(&self) -> Result<ArchiveReport, StageError> {
        let paths = self
            .config
            .archive
            .as_ref()
            .ok_or(StageError::NotConfigured("archive paths"))?;
        Ok(fsops::archive(&paths.source, &paths.destination)?)
    }

    fn prune_logs(&self) -> Result<PruneReport, StageError> {
        tracing::info!(
            dir = %self.config.log_dir.display(),
            days = LOG_RETENTION_DAYS,
            "pruning old log files"
        );
        let report = fsops::prune(&self.config.log_dir, LOG_RETENTION_DAYS)?;
        if !report.errors.is_empty() {
            tracing::warn!(
                errors = report.errors.len(),
                "some log files or directories could not be pruned"
            );
        }
        Ok(report)
    }
}
