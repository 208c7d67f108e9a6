//! Error types for remote fetches.

use thiserror::Error;

/// A remote fetch failure.
///
/// Every variant means the same thing to the components: the GET did not
/// produce a usable body. The variants only carry diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Body could not be read or decoded
    #[error("invalid response: {0}")]
    ParseError(String),
}

impl FetchError {
    /// Classify a reqwest error.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_seconds: Option<u64>) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(timeout_seconds.unwrap_or_default())
        } else if let Some(status) = e.status() {
            FetchError::HttpError(status.as_u16())
        } else {
            FetchError::ConnectionFailed(e.to_string())
        }
    }
}
