//! History command implementation

use crate::cli::output::{format_history_json, format_history_table};
use crate::cli::{load_config_with_overrides, HistoryArgs};
use crate::history::HistoryWindow;
use crate::logging::init_tracing;
use crate::transport::HttpTransport;
use chrono::Local;
use std::sync::Arc;

/// Handle `ingest-metrics history` command
pub async fn run_history(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        load_config_with_overrides(&args.config, args.url.as_deref(), args.log_level.as_deref())?;
    if let Some(ref ingest_type) = args.ingest_type {
        config.history.ingest_type = ingest_type.clone();
    }
    if let Some(days) = args.lookback_days {
        config.history.lookback_days = days;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    let transport = Arc::new(HttpTransport::new(&config.service)?);
    let mut history = HistoryWindow::ending_today(
        transport,
        &config.service.path_prefix,
        &config.history,
        &Local::now(),
    );
    if let Some(start) = args.start {
        history.set_start(start);
    }
    if let Some(end) = args.end {
        history.set_end(end);
    }
    if history.start() >= history.end() {
        tracing::warn!(
            start = history.start(),
            end = history.end(),
            "Window is empty or inverted"
        );
    }

    tracing::info!(
        base_url = %config.service.base_url,
        url = %history.build_url(),
        "Fetching ingest history"
    );

    history.fetch_all().await?;

    let output = if args.json {
        format_history_json(history.window(), history.records())?
    } else {
        format_history_table(history.window(), history.records())
    };
    println!("{}", output);

    Ok(())
}
