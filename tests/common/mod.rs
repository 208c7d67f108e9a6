//! Shared helpers for integration tests.

#![allow(dead_code)]

use ingest_metrics::config::ServiceConfig;
use ingest_metrics::transport::{HttpTransport, Transport};
use std::sync::Arc;

/// Path prefix the mock servers mount endpoints under.
pub const PREFIX: &str = "/DataWave/Ingest/Metrics";

pub const RATE_PATH: &str = "/DataWave/Ingest/Metrics/services/statistics";

pub const HISTORY_PATH: &str = "/DataWave/Ingest/Metrics/services/ecs";

/// Service config pointing at a mock server.
pub fn service_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        base_url: base_url.to_string(),
        path_prefix: PREFIX.to_string(),
        timeout_seconds: None,
    }
}

/// HTTP transport pointing at a mock server.
pub fn http_transport(base_url: &str) -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new(&service_config(base_url)).unwrap())
}
