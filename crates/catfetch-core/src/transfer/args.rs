//! Argument vector for the transfer client, ncftpget style:
//! `-u USER -p PASS -d DEBUGLOG -R HOST LOCAL REMOTE`.

use std::path::{Path, PathBuf};

use crate::catalog::DownloadTask;
use crate::config::TransferSettings;

const PASSWORD_FLAG: &str = "-p";

/// `<log_dir>/<stamp>_.log`, the client's debug log for one invocation.
pub fn transfer_log_path(log_dir: &Path, stamp: &str) -> PathBuf {
    log_dir.join(format!("{stamp}_.log"))
}

/// Build the client arguments for `task`. `-R` is always passed: it makes
/// directory fetches recursive and is harmless for a single file.
pub fn build_args(settings: &TransferSettings, task: &DownloadTask, stamp: &str) -> Vec<String> {
    vec![
        "-u".to_string(),
        settings.username.clone(),
        PASSWORD_FLAG.to_string(),
        settings.password.clone(),
        "-d".to_string(),
        transfer_log_path(&settings.log_dir, stamp)
            .to_string_lossy()
            .into_owned(),
        "-R".to_string(),
        settings.host.clone(),
        task.local_path.clone(),
        task.remote_source(),
    ]
}

/// Command line for logs; the value after `-p` is masked.
pub fn render_command(program: &Path, args: &[String]) -> String {
    let mut out = program.display().to_string();
    let mut mask_next = false;
    for arg in args {
        out.push(' ');
        if mask_next {
            out.push_str("****");
        } else {
            out.push_str(arg);
        }
        mask_next = arg == PASSWORD_FLAG;
    }
    out
}
