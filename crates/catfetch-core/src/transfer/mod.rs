//! Transfer invoker: one blocking run of the external transfer client per
//! task, classified by exit code. No retries.

mod args;
mod error;
mod process;

pub use args::{build_args, render_command, transfer_log_path};
pub use error::TransferError;
pub use process::ProcessTransferClient;

use async_trait::async_trait;
use serde::Serialize;

/// What the client left behind: exit code plus captured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TransferOutcome {
    /// Exit code 0 is success; anything else is a failure carrying the code,
    /// the rendered command line and the client's stderr.
    pub fn into_result(self, command: String) -> Result<TransferOutcome, TransferError> {
        if self.exit_code == 0 {
            return Ok(self);
        }
        Err(TransferError::Failed {
            code: self.exit_code,
            command,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Rendered command line for logs, with the password masked.
    fn describe(&self, args: &[String]) -> String;

    /// Run the client once with `args` and wait for it to finish.
    async fn invoke(&self, args: &[String]) -> Result<TransferOutcome, TransferError>;
}
