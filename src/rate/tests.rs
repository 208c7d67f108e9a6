//! Unit tests for the rate module.

use super::*;
use crate::schedule::ManualScheduler;
use crate::transport::testing::ScriptedTransport;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Transport that blocks each request until released.
#[derive(Default)]
struct GatedTransport {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get_json(&self, _path_and_query: &str) -> Result<Value, FetchError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(json!({"rate": 7}))
    }
}

fn refresher(transport: Arc<dyn Transport>, scheduler: Arc<ManualScheduler>) -> RateRefresher {
    RateRefresher::new(
        transport,
        scheduler,
        "/DataWave/Ingest/Metrics",
        &RateConfig::default(),
    )
}

// ============================================================================
// RateConfig
// ============================================================================

#[test]
fn test_config_default_values() {
    let config = RateConfig::default();
    assert_eq!(config.interval_millis, 5000);
    assert_eq!(config.statistic_type, "queryRate");
}

#[test]
fn test_config_partial_toml() {
    let config: RateConfig = toml::from_str("interval_millis = 250").unwrap();
    assert_eq!(config.interval_millis, 250);
    assert_eq!(config.statistic_type, "queryRate");
}

// ============================================================================
// Endpoint
// ============================================================================

#[test]
fn test_rate_endpoint() {
    assert_eq!(
        rate_endpoint("/DataWave/Ingest/Metrics", "queryRate"),
        "/DataWave/Ingest/Metrics/services/statistics?type=queryRate"
    );
    assert_eq!(
        rate_endpoint("/", "queryRate"),
        "/services/statistics?type=queryRate"
    );
}

// ============================================================================
// Polling flag and interval
// ============================================================================

#[test]
fn test_new_refresher_is_idle() {
    let r = refresher(ScriptedTransport::new(vec![]), Arc::new(ManualScheduler::new()));
    assert!(!r.is_polling());
    assert_eq!(r.interval(), Duration::from_millis(5000));
    assert!(r.record().is_none());
}

#[test]
fn test_start_polling_without_interval_keeps_stored_interval() {
    let r = refresher(ScriptedTransport::new(vec![]), Arc::new(ManualScheduler::new()));
    r.start_polling(Some(1000));
    r.stop_polling();
    r.start_polling(None);
    assert!(r.is_polling());
    assert_eq!(r.interval(), Duration::from_millis(1000));
}

#[test]
fn test_start_polling_does_not_fetch() {
    let transport = ScriptedTransport::new(vec![]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport.clone(), scheduler.clone());

    r.start_polling(Some(1000));

    assert!(transport.requests().is_empty());
    assert_eq!(scheduler.pending_count(), 0);
}

// ============================================================================
// Fetch cycles
// ============================================================================

#[tokio::test]
async fn test_success_schedules_one_timer_at_interval() {
    let body = json!({"queriesPerSecond": 12.5});
    let transport = ScriptedTransport::new(vec![Ok(body.clone())]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport.clone(), scheduler.clone());

    r.start_polling(Some(1000));
    let outcome = r.fetch_once().await;

    assert!(matches!(
        outcome,
        CycleOutcome::Refreshed {
            rescheduled: true,
            ..
        }
    ));
    assert_eq!(scheduler.pending(), vec![Duration::from_millis(1000)]);
    assert_eq!(r.record(), Some(RateRecord(body)));
    assert_eq!(
        transport.requests(),
        vec!["/DataWave/Ingest/Metrics/services/statistics?type=queryRate".to_string()]
    );
}

#[tokio::test]
async fn test_failure_schedules_nothing_and_keeps_record() {
    let first = json!({"queriesPerSecond": 1});
    let transport =
        ScriptedTransport::new(vec![Ok(first.clone()), Err(FetchError::HttpError(500))]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport, scheduler.clone());

    r.fetch_once().await;
    assert_eq!(scheduler.pending_count(), 0);

    r.start_polling(Some(1000));
    let outcome = r.fetch_once().await;

    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            error: FetchError::HttpError(500)
        }
    );
    assert_eq!(scheduler.pending_count(), 0);
    assert_eq!(r.record(), Some(RateRecord(first)));
    // Flag is left as the caller set it; only the chain stops.
    assert!(r.is_polling());
}

#[tokio::test]
async fn test_fetch_without_polling_does_not_reschedule() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"n": 1}))]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport, scheduler.clone());

    let outcome = r.fetch_once().await;

    assert!(matches!(
        outcome,
        CycleOutcome::Refreshed {
            rescheduled: false,
            ..
        }
    ));
    assert_eq!(scheduler.pending_count(), 0);
    assert!(r.record().is_some());
}

#[tokio::test]
async fn test_chain_runs_until_failure() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({"n": 1})),
        Ok(json!({"n": 2})),
        Ok(json!({"n": 3})),
        Err(FetchError::Timeout(5)),
    ]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport.clone(), scheduler.clone());

    r.start_polling(Some(250));
    r.fetch_once().await;

    let mut fired = 0;
    while let Some(delay) = scheduler.run_next().await {
        assert_eq!(delay, Duration::from_millis(250));
        // Strictly sequential: never more than one timer queued.
        assert!(scheduler.pending_count() <= 1);
        fired += 1;
    }

    assert_eq!(fired, 3);
    assert_eq!(transport.requests().len(), 4);
    assert_eq!(r.record(), Some(RateRecord(json!({"n": 3}))));
}

#[tokio::test]
async fn test_interval_change_applies_to_next_cycle() {
    let transport = ScriptedTransport::new(vec![Ok(json!({})), Ok(json!({}))]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport, scheduler.clone());

    r.start_polling(None);
    r.fetch_once().await;
    assert_eq!(scheduler.pending(), vec![Duration::from_millis(5000)]);

    r.start_polling(Some(2000));
    scheduler.run_next().await;
    assert_eq!(scheduler.pending(), vec![Duration::from_millis(2000)]);
}

#[tokio::test]
async fn test_stop_polling_during_inflight_fetch() {
    let transport = Arc::new(GatedTransport::default());
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport.clone(), scheduler.clone());

    r.start_polling(Some(1000));
    let handle = tokio::spawn(r.fetch_once());

    transport.entered.notified().await;
    r.stop_polling();
    transport.release.notify_one();

    let outcome = handle.await.unwrap();
    assert!(matches!(
        outcome,
        CycleOutcome::Refreshed {
            rescheduled: false,
            ..
        }
    ));
    assert_eq!(scheduler.pending_count(), 0);
    // The in-flight response still lands.
    assert_eq!(r.record(), Some(RateRecord(json!({"rate": 7}))));
}

#[tokio::test]
async fn test_subscribe_sees_replacement() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"n": 42}))]);
    let r = refresher(transport, Arc::new(ManualScheduler::new()));
    let mut rx = r.subscribe();

    r.fetch_once().await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(
        rx.borrow_and_update().clone(),
        Some(RateRecord(json!({"n": 42})))
    );
}

#[tokio::test]
async fn test_outcomes_report_scheduled_failure() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({"n": 1})),
        Err(FetchError::HttpError(500)),
    ]);
    let scheduler = Arc::new(ManualScheduler::new());
    let r = refresher(transport, scheduler.clone());
    let mut outcomes = r.subscribe_outcomes();
    assert_eq!(*outcomes.borrow(), None);

    r.start_polling(Some(100));
    r.fetch_once().await;
    assert!(matches!(
        outcomes.borrow_and_update().clone(),
        Some(CycleOutcome::Refreshed {
            rescheduled: true,
            ..
        })
    ));

    // The second cycle runs from the scheduler, not from a direct call.
    scheduler.run_next().await;
    assert!(outcomes.has_changed().unwrap());
    assert_eq!(
        outcomes.borrow_and_update().clone(),
        Some(CycleOutcome::Failed {
            error: FetchError::HttpError(500)
        })
    );
    assert_eq!(scheduler.pending_count(), 0);
}
