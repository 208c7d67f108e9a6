//! Errors raised while loading or validating a [`MetricsConfig`](super::MetricsConfig).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid TOML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl ConfigError {
    /// Dotted key of the offending setting, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
