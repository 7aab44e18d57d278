use std::path::PathBuf;
use thiserror::Error;

/// A single transfer attempt that did not succeed.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer client not found at {program}")]
    NotFound { program: PathBuf },

    #[error("failed to launch transfer client {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer failed with exit code {code}: {command}{}", stderr_suffix(.stderr))]
    Failed {
        code: i32,
        command: String,
        stderr: String,
    },

    #[error("transfer client was terminated by a signal: {command}")]
    Killed { command: String },

    #[error("transfer timed out after {timeout_secs}s and was killed: {command}")]
    TimedOut { timeout_secs: u64, command: String },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" ({stderr})")
    }
}
