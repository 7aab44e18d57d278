//! Job configuration: a flat string-keyed map loaded once at startup, then
//! validated into a typed [`JobConfig`].

mod error;
mod flag;
mod load;
mod types;

pub use error::ConfigError;
pub use flag::{is_true, StageFlags, UNSET};
pub use load::{default_config_path, load_from_path, parse_properties, Properties};
pub use types::{
    keys, ArchiveSettings, CatalogSettings, JobConfig, TransferSettings, DEFAULT_TRANSFER_CLIENT,
};
