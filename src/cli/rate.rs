//! Rate command implementation

use crate::cli::output::{format_rate_json, format_rate_table};
use crate::cli::{load_config_with_overrides, RateArgs};
use crate::logging::init_tracing;
use crate::rate::{CycleOutcome, RateRecord, RateRefresher};
use crate::schedule::TokioScheduler;
use crate::transport::HttpTransport;
use chrono::Local;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn print_record(record: &RateRecord, json: bool) {
    let now = Local::now();
    if json {
        println!("{}", format_rate_json(record, &now));
    } else {
        println!("{}", format_rate_table(record, &now));
    }
}

/// Handle `ingest-metrics rate` command
///
/// Any failed cycle halts the polling chain and is reported as an error.
/// Otherwise polling continues until `--count` records were printed or
/// Ctrl-C is received.
pub async fn run_rate(args: RateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        load_config_with_overrides(&args.config, args.url.as_deref(), args.log_level.as_deref())?;
    if let Some(ms) = args.interval {
        config.rate.interval_millis = ms;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    let transport = Arc::new(HttpTransport::new(&config.service)?);
    let cancel_token = CancellationToken::new();
    let scheduler = Arc::new(TokioScheduler::new(cancel_token.clone()));
    let refresher = RateRefresher::new(
        transport,
        scheduler,
        &config.service.path_prefix,
        &config.rate,
    );

    tracing::info!(
        base_url = %config.service.base_url,
        endpoint = %refresher.endpoint(),
        "Fetching query rate"
    );

    let mut outcomes = refresher.subscribe_outcomes();
    if !args.once {
        refresher.start_polling(Some(config.rate.interval_millis));
    }

    let first = refresher.fetch_once().await;
    let mut printed = 0usize;
    if args.once {
        return observe(&refresher, first, &args, &mut printed);
    }

    // The first outcome is still unseen on `outcomes`; a failure is
    // terminal, so it stays the latest value once sent.
    let mut result = Ok(());
    while result.is_ok() && args.count.map_or(true, |limit| printed < limit) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, stopping");
                break;
            }
            changed = outcomes.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = outcomes.borrow_and_update().clone();
                if let Some(outcome) = latest {
                    result = observe(&refresher, outcome, &args, &mut printed);
                }
            }
        }
    }

    refresher.stop_polling();
    cancel_token.cancel();
    result
}

/// Print the record after a successful cycle; turn a failed one into an error.
fn observe(
    refresher: &RateRefresher,
    outcome: CycleOutcome,
    args: &RateArgs,
    printed: &mut usize,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        CycleOutcome::Refreshed { .. } => {
            if let Some(record) = refresher.record() {
                print_record(&record, args.json);
                *printed += 1;
            }
            Ok(())
        }
        CycleOutcome::Failed { error } => Err(error.into()),
    }
}
