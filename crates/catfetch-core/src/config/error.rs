use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. Any of these aborts the job before a stage runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("required setting `{key}` is not set")]
    Missing { key: &'static str },

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("could not resolve XDG directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}
