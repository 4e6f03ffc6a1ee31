use std::path::PathBuf;

use thiserror::Error;

/// Load-time failures. Every variant is fatal: the process must not run on a partial snapshot.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration object '{document}' doesn't have data key '{key}'")]
    MissingKey { document: String, key: String },

    #[error("malformed policy document: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("invalid policy: {0}")]
    Invalid(String),

    #[error("failed to read configuration object from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
