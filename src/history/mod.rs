//! Date-windowed ingest history.
//!
//! [`HistoryWindow`] owns an ordered sequence of ingest-history records scoped
//! to a mutable `[start, end)` window and ingest-type filter. The fetch URL is
//! derived from the current window on every call.

mod config;
mod window;


pub use config::*;
pub use window::*;

use crate::transport::{FetchError, Transport};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One opaque ingest-history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryRecord(pub Value);

/// Ingest-history records for a window.
pub struct HistoryWindow {
    transport: Arc<dyn Transport>,
    /// Service path prefix, without a trailing slash
    path_prefix: String,
    window: Window,
    records: Vec<HistoryRecord>,
}

impl HistoryWindow {
    /// Create an empty collection scoped to `window`.
    pub fn new(transport: Arc<dyn Transport>, path_prefix: &str, window: Window) -> Self {
        Self {
            transport,
            path_prefix: path_prefix.trim_end_matches('/').to_string(),
            window,
            records: Vec::new(),
        }
    }

    /// Create an empty collection with the default window relative to `now`.
    pub fn ending_today<Tz: TimeZone>(
        transport: Arc<dyn Transport>,
        path_prefix: &str,
        config: &HistoryConfig,
        now: &DateTime<Tz>,
    ) -> Self {
        let window = Window::ending_today(now, config.lookback_days, config.ingest_type.clone());
        Self::new(transport, path_prefix, window)
    }

    pub fn start(&self) -> i64 {
        self.window.start
    }

    /// Set the inclusive start in epoch millis and return it.
    pub fn set_start(&mut self, start: i64) -> i64 {
        self.window.start = start;
        self.window.start
    }

    pub fn end(&self) -> i64 {
        self.window.end
    }

    /// Set the exclusive end in epoch millis and return it.
    pub fn set_end(&mut self, end: i64) -> i64 {
        self.window.end = end;
        self.window.end
    }

    pub fn ingest_type(&self) -> &str {
        &self.window.ingest_type
    }

    /// Set the ingest-type tag and return it.
    pub fn set_ingest_type(&mut self, ingest_type: impl Into<String>) -> &str {
        self.window.ingest_type = ingest_type.into();
        &self.window.ingest_type
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Path and query for the current window.
    pub fn build_url(&self) -> String {
        format!(
            "{}/services/ecs?start={}&end={}&ingestType={}",
            self.path_prefix,
            self.window.start,
            self.window.end,
            urlencoding::encode(&self.window.ingest_type)
        )
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fetch the current window and replace all records with the response.
    ///
    /// On error the previous records are kept.
    pub async fn fetch_all(&mut self) -> Result<&[HistoryRecord], FetchError> {
        let url = self.build_url();
        let body = self.transport.get_json(&url).await?;
        let records = parse_history(body)?;

        tracing::debug!(
            url = %url,
            records = records.len(),
            "Ingest history fetched"
        );

        self.records = records;
        Ok(&self.records)
    }
}

fn parse_history(body: Value) -> Result<Vec<HistoryRecord>, FetchError> {
    match body {
        Value::Array(items) => Ok(items.into_iter().map(HistoryRecord).collect()),
        other => Err(FetchError::ParseError(format!(
            "expected a JSON array of history entries, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
