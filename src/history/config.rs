//! Configuration for ingest-history fetches.

use serde::{Deserialize, Serialize};

/// Defaults for a newly constructed history window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Ingest-type tag sent as `ingestType`
    pub ingest_type: String,
    /// Whole days before today's local midnight that the window starts
    pub lookback_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            ingest_type: "bulk".to_string(),
            lookback_days: 14,
        }
    }
}
