//! Timestamps used to name per-run and per-transfer log files.

use chrono::{DateTime, Local};

/// `yyyyMMdd.HHmmss`, the naming pattern shared by job and transfer logs.
pub const STAMP_FORMAT: &str = "%Y%m%d.%H%M%S";

pub fn format_stamp(at: DateTime<Local>) -> String {
    at.format(STAMP_FORMAT).to_string()
}

/// Stamp for the current local time.
pub fn now() -> String {
    format_stamp(Local::now())
}
