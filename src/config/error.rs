//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::RuleLoadError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    #[error("failed to parse {key}='{value}': {error}")]
    Parse {
        key: String,
        value: String,
        error: String,
    },

    /// Invalid value for environment variable.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// IO error reading a referenced file.
    #[error("IO error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule table could not be loaded.
    #[error(transparent)]
    Rules(#[from] RuleLoadError),

    /// Baselines file is not a JSON object of numbers.
    #[error("invalid baselines in '{}': {source}", path.display())]
    Baselines {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
