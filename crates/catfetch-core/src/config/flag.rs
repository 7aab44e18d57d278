//! Stage flag parsing.

use super::load::Properties;
use super::types::keys;

/// Stand-in value for a flag whose key is absent. Never parses as true.
pub const UNSET: &str = "has not set";

/// A flag value is true iff it equals `Y` ignoring case, or parses as the
/// boolean `true` (also ignoring case). Everything else, including `1`,
/// `yes`, surrounding whitespace and the [`UNSET`] placeholder, is false.
pub fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("Y") || value.eq_ignore_ascii_case("true")
}

/// The three independent stage switches of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StageFlags {
    /// `store.mk`: refresh the catalog and dispatch downloads.
    pub store: bool,
    /// `move.mk`: archive the download tree.
    pub move_files: bool,
    /// `del.log.mk`: prune old log files.
    pub delete_logs: bool,
}

impl StageFlags {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            store: props.flag(keys::STORE_MK),
            move_files: props.flag(keys::MOVE_MK),
            delete_logs: props.flag(keys::DEL_LOG_MK),
        }
    }
}
