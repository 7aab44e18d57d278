//! CLI for the catfetch scheduled transfer job.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use catfetch_core::config;
use clap::{Parser, Subcommand};

use commands::{run_check, run_job};

/// Top-level CLI for the catfetch job.
#[derive(Debug, Parser)]
#[command(name = "catfetch")]
#[command(about = "catfetch: catalog-driven scheduled file retrieval", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the job once: catalog refresh and downloads, archiving, log pruning, as configured.
    Run {
        /// Job configuration file (default: $XDG_CONFIG_HOME/catfetch/catfetch.properties).
        config: Option<PathBuf>,
        /// Print the full job report as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and show what a run would do, without running it.
    Check {
        /// Job configuration file (default: $XDG_CONFIG_HOME/catfetch/catfetch.properties).
        config: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { config, json } => run_job(&config_path(config)?, json).await?,
            CliCommand::Check { config } => run_check(&config_path(config)?)?,
        }

        Ok(())
    }
}

fn config_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(path) => Ok(path),
        None => Ok(config::default_config_path()?),
    }
}

#[cfg(test)]
mod tests;
