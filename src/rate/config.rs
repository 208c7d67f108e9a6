//! Configuration for query-rate polling.

use serde::{Deserialize, Serialize};

/// Configuration for the query-rate refresher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Milliseconds between the end of one fetch and the start of the next
    pub interval_millis: u64,
    /// Value of the `type` query parameter on the statistics endpoint
    pub statistic_type: String,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            interval_millis: 5000,
            statistic_type: "queryRate".to_string(),
        }
    }
}
