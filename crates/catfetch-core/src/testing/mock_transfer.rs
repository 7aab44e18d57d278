use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transfer::{render_command, TransferClient, TransferError, TransferOutcome};

/// Transfer client that succeeds unless told otherwise, keyed by the remote
/// source argument, and records every argument vector it receives.
#[derive(Default)]
pub struct MockTransferClient {
    exit_codes: HashMap<String, i32>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockTransferClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` whenever the remote source equals `remote`.
    pub fn fail_remote(mut self, remote: &str, code: i32) -> Self {
        self.exit_codes.insert(remote.to_string(), code);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Last argument of each call, which is the remote source.
    pub fn remote_sources(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|args| args.last().cloned())
            .collect()
    }
}

#[async_trait]
impl TransferClient for MockTransferClient {
    fn describe(&self, args: &[String]) -> String {
        render_command(Path::new("mock-transfer"), args)
    }

    async fn invoke(&self, args: &[String]) -> Result<TransferOutcome, TransferError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let exit_code = args
            .last()
            .and_then(|remote| self.exit_codes.get(remote))
            .copied()
            .unwrap_or(0);
        TransferOutcome {
            exit_code,
            stdout: String::new(),
            stderr: if exit_code == 0 {
                String::new()
            } else {
                "mock transfer failure".to_string()
            },
        }
        .into_result(self.describe(args))
    }
}
