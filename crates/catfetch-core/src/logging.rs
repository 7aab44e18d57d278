//! Logging: stderr until the config is known, then a per-run file under
//! `ftp.logdir` named `<yyyyMMdd.HHmmss>.log`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::stamp;

const DEFAULT_FILTER: &str = "info,catfetch_core=debug,catfetch=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Process-wide stderr logging. Safe to call more than once.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

/// The job's log file, active on the current thread while this value lives.
///
/// Every event is written straight to the file handle, so dropping the sink
/// (on any return path) leaves nothing unflushed.
pub struct RunLog {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl RunLog {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create `<log_dir>/<stamp>.log` and route this thread's events to it.
pub fn open_run_log(log_dir: &Path) -> io::Result<RunLog> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!("{}.log", stamp::now()));
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    tracing::info!("catfetch logging to {}", path.display());
    Ok(RunLog {
        path,
        _guard: guard,
    })
}
