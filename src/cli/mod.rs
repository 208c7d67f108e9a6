//! CLI module for the ingest-metrics client
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `rate` - Fetch or poll query-rate statistics
//! - `history` - Fetch ingest history for a time window
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Poll every two seconds, stop after ten snapshots
//! ingest-metrics rate --interval 2000 --count 10
//!
//! # Live ingest history for the default two-week window, as JSON
//! ingest-metrics history --ingest-type live --json
//! ```

pub mod completions;
pub mod config;
pub mod history;
pub mod output;
pub mod rate;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::MetricsConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Ingest metrics client
#[derive(Parser, Debug)]
#[command(
    name = "ingest-metrics",
    version,
    about = "Query-rate polling and ingest history client"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch or poll query-rate statistics
    Rate(RateArgs),
    /// Fetch ingest history for a time window
    History(HistoryArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "ingest-metrics.toml")]
    pub config: PathBuf,

    /// Override service base URL
    #[arg(short, long, env = "INGEST_METRICS_URL")]
    pub url: Option<String>,

    /// Polling interval in milliseconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Fetch a single snapshot and exit
    #[arg(long, conflicts_with = "count")]
    pub once: bool,

    /// Stop after printing this many snapshots
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "INGEST_METRICS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "ingest-metrics.toml")]
    pub config: PathBuf,

    /// Override service base URL
    #[arg(short, long, env = "INGEST_METRICS_URL")]
    pub url: Option<String>,

    /// Window start, epoch milliseconds (inclusive)
    #[arg(short, long, allow_hyphen_values = true)]
    pub start: Option<i64>,

    /// Window end, epoch milliseconds (exclusive)
    #[arg(short, long, allow_hyphen_values = true)]
    pub end: Option<i64>,

    /// Ingest-type filter
    #[arg(short = 't', long)]
    pub ingest_type: Option<String>,

    /// Days before today included in the default window
    #[arg(long)]
    pub lookback_days: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "INGEST_METRICS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "ingest-metrics.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides
///
/// A missing file at the default path falls back to defaults.
pub fn load_config_with_overrides(
    path: &Path,
    url: Option<&str>,
    log_level: Option<&str>,
) -> Result<MetricsConfig, Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        MetricsConfig::load(Some(path))?
    } else {
        MetricsConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(url) = url {
        config.service.base_url = url.to_string();
    }
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }

    Ok(config)
}
