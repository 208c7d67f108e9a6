//! Transport seam shared by the rate and history components.
//!
//! A [`Transport`] performs one GET against a path-and-query relative to
//! the service root and yields the decoded JSON body. [`HttpTransport`]
//! is the production implementation over a pooled `reqwest::Client`.

mod error;

pub use error::*;

use crate::config::ServiceConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Issues GET requests and decodes JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path_and_query` and decode the body as JSON.
    async fn get_json(&self, path_and_query: &str) -> Result<Value, FetchError>;
}

/// HTTP transport rooted at a base URL.
pub struct HttpTransport {
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Scheme, host and port, without a trailing slash
    base_url: String,
    /// Per-request timeout; `None` leaves it to the client
    timeout_seconds: Option<u64>,
}

impl HttpTransport {
    /// Create a transport with a default HTTP client.
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            FetchError::ConnectionFailed(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(Self::with_client(config, client))
    }

    /// Create a transport with a custom HTTP client (for testing).
    pub fn with_client(config: &ServiceConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path_and_query: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let endpoint = endpoint_label(path_and_query);
        let start = Instant::now();

        let result = self.fetch(&url).await;

        metrics::histogram!("ingest_metrics_fetch_latency_seconds",
            "endpoint" => endpoint.clone()
        )
        .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => tracing::debug!(url = %url, "Fetch succeeded"),
            Err(error) => {
                metrics::counter!("ingest_metrics_fetch_failures_total",
                    "endpoint" => endpoint
                )
                .increment(1);
                tracing::debug!(url = %url, error = %error, "Fetch failed");
            }
        }

        result
    }
}

impl HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let mut request = self.client.get(url);
        if let Some(secs) = self.timeout_seconds {
            request = request.timeout(Duration::from_secs(secs));
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(FetchError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::ParseError(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::ParseError(e.to_string()))
    }
}

/// Path component of a path-and-query, used as a metrics label.
fn endpoint_label(path_and_query: &str) -> String {
    path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path)
        .to_string()
}
