//! `catfetch run` – one unattended run of the job.

use std::path::Path;

use anyhow::{Context, Result};
use catfetch_core::catalog::SqlCatalog;
use catfetch_core::config::{self, JobConfig};
use catfetch_core::job::Job;
use catfetch_core::logging;
use catfetch_core::transfer::ProcessTransferClient;

/// Load and validate the config, then run every enabled stage.
///
/// Only configuration problems return an error. Stage and task failures are
/// logged and reported but leave the exit status at zero.
pub async fn run_job(config_path: &Path, json: bool) -> Result<()> {
    let props = config::load_from_path(config_path)?;
    let cfg = JobConfig::from_properties(&props)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    // Held until return; events go to the run's log file meanwhile.
    let _run_log = match logging::open_run_log(&cfg.log_dir) {
        Ok(sink) => Some(sink),
        Err(e) => {
            tracing::warn!(
                "could not open run log in {}: {}; logging to stderr",
                cfg.log_dir.display(),
                e
            );
            None
        }
    };
    tracing::info!(config = %config_path.display(), "catalog file retrieval job starting");
    tracing::debug!("loaded config: {:?}", cfg);

    let catalog = cfg
        .catalog
        .as_ref()
        .map(SqlCatalog::connect_lazy)
        .transpose()
        .context("invalid catalog connection settings")?;
    let transfer = cfg
        .transfer
        .as_ref()
        .map(ProcessTransferClient::from_settings);

    let mut job = Job::new(&cfg);
    if let Some(catalog) = &catalog {
        job = job.with_catalog(catalog);
    }
    if let Some(transfer) = &transfer {
        job = job.with_transfer(transfer);
    }
    let report = job.run().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    if report.task_failures() > 0 || report.any_stage_failed() {
        tracing::warn!(
            task_failures = report.task_failures(),
            "job finished with failures; see log for details"
        );
    }
    Ok(())
}
