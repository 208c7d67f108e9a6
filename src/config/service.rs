//! Remote service location

use serde::{Deserialize, Serialize};

/// Where the ingest-metrics service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Scheme, host and port of the service
    pub base_url: String,
    /// Path under which the service endpoints are mounted
    pub path_prefix: String,
    /// Per-request timeout; unset means the HTTP client's own behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            path_prefix: "/DataWave/Ingest/Metrics".to_string(),
            timeout_seconds: None,
        }
    }
}
