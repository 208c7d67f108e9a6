//! Configuration module for the ingest-metrics client
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`INGEST_METRICS_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use ingest_metrics::config::MetricsConfig;
//!
//! let toml = r#"
//! [service]
//! base_url = "http://metrics.example:8443"
//!
//! [rate]
//! interval_millis = 1000
//! "#;
//! let config: MetricsConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.service.base_url, "http://metrics.example:8443");
//! assert_eq!(config.rate.interval_millis, 1000);
//! assert_eq!(config.history.ingest_type, "bulk");
//! ```

pub mod error;
pub mod logging;
pub mod service;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use service::ServiceConfig;

pub use crate::history::HistoryConfig;
pub use crate::rate::RateConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// Remote service location
    pub service: ServiceConfig,
    /// Query-rate polling
    pub rate: RateConfig,
    /// Ingest-history window defaults
    pub history: HistoryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl MetricsConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    message: e.message().to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (current values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("INGEST_METRICS_URL") {
            self.service.base_url = url;
        }

        if let Ok(interval) = std::env::var("INGEST_METRICS_POLL_INTERVAL") {
            if let Ok(ms) = interval.parse() {
                self.rate.interval_millis = ms;
            }
        }
        if let Ok(ingest_type) = std::env::var("INGEST_METRICS_INGEST_TYPE") {
            self.history.ingest_type = ingest_type;
        }

        if let Ok(level) = std::env::var("INGEST_METRICS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("INGEST_METRICS_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "service.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&self.service.base_url) {
            return Err(ConfigError::Validation {
                field: "service.base_url".to_string(),
                message: e.to_string(),
            });
        }

        if !self.service.path_prefix.starts_with('/') {
            return Err(ConfigError::Validation {
                field: "service.path_prefix".to_string(),
                message: "prefix must start with '/'".to_string(),
            });
        }

        if self.rate.interval_millis == 0 {
            return Err(ConfigError::Validation {
                field: "rate.interval_millis".to_string(),
                message: "interval must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
