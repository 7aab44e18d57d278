//! Transfer client backed by a real child process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::args::render_command;
use super::error::TransferError;
use super::{TransferClient, TransferOutcome};
use crate::config::TransferSettings;

/// Launches `program` once per invocation and waits for it.
///
/// Without a timeout a hung client hangs the job. With one, the child is
/// killed when the limit passes and the task fails with
/// [`TransferError::TimedOut`].
#[derive(Debug, Clone)]
pub struct ProcessTransferClient {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessTransferClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub fn from_settings(settings: &TransferSettings) -> Self {
        Self::new(settings.client.clone()).with_timeout(settings.timeout)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl TransferClient for ProcessTransferClient {
    fn describe(&self, args: &[String]) -> String {
        render_command(&self.program, args)
    }

    async fn invoke(&self, args: &[String]) -> Result<TransferOutcome, TransferError> {
        let command = self.describe(args);
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = cmd.output();

        // Dropping the unfinished future drops the child, which kills it.
        let output = match self.timeout {
            Some(limit) => match timeout(limit, output).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(TransferError::TimedOut {
                        timeout_secs: limit.as_secs(),
                        command,
                    })
                }
            },
            None => output.await,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransferError::NotFound {
                    program: self.program.clone(),
                }
            } else {
                TransferError::Launch {
                    program: self.program.clone(),
                    source: e,
                }
            }
        })?;

        let Some(exit_code) = output.status.code() else {
            return Err(TransferError::Killed { command });
        };
        TransferOutcome {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into_result(command)
    }
}
