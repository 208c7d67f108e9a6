//! Query-rate statistics with a self-rescheduling refresh chain.
//!
//! [`RateRefresher`] holds the most recent query-rate snapshot. Each
//! successful [`RateRefresher::fetch_once`] replaces the snapshot and, while
//! polling is enabled, schedules exactly one follow-up fetch. A failed fetch
//! schedules nothing, so the chain halts until a caller kicks it off again.

mod config;

#[cfg(test)]
mod tests;

pub use config::*;

use crate::schedule::Scheduler;
use crate::transport::{FetchError, Transport};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Opaque query-rate snapshot, replaced wholesale on each fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateRecord(pub serde_json::Value);

/// Result of a single fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Record replaced; `rescheduled` tells whether a next cycle was queued
    Refreshed { latency_ms: u32, rescheduled: bool },
    /// Fetch failed; record untouched and no next cycle queued
    Failed { error: FetchError },
}

/// Polling holder for the query-rate statistics record.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct RateRefresher {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    /// Path and query of the statistics endpoint
    endpoint: String,
    polling: AtomicBool,
    interval_millis: AtomicU64,
    record: watch::Sender<Option<RateRecord>>,
    /// Outcome of the latest cycle, scheduled or direct
    outcome: watch::Sender<Option<CycleOutcome>>,
}

impl RateRefresher {
    /// Create a refresher for the statistics endpoint under `path_prefix`.
    pub fn new(
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
        path_prefix: &str,
        config: &RateConfig,
    ) -> Self {
        let (record, _) = watch::channel(None);
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                transport,
                scheduler,
                endpoint: rate_endpoint(path_prefix, &config.statistic_type),
                polling: AtomicBool::new(false),
                interval_millis: AtomicU64::new(config.interval_millis),
                record,
                outcome,
            }),
        }
    }

    /// Enable polling, optionally replacing the stored interval.
    ///
    /// Does not fetch; the chain starts with the next [`fetch_once`](Self::fetch_once).
    pub fn start_polling(&self, interval_millis: Option<u64>) {
        if let Some(ms) = interval_millis {
            self.inner.interval_millis.store(ms, Ordering::SeqCst);
        }
        self.inner.polling.store(true, Ordering::SeqCst);
        tracing::debug!(
            interval_millis = self.inner.interval_millis.load(Ordering::SeqCst),
            "Polling enabled"
        );
    }

    /// Disable polling. An in-flight fetch still completes and still
    /// replaces the record, but queues no further cycle.
    pub fn stop_polling(&self) {
        self.inner.polling.store(false, Ordering::SeqCst);
        tracing::debug!("Polling disabled");
    }

    pub fn is_polling(&self) -> bool {
        self.inner.polling.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.inner.interval_millis.load(Ordering::SeqCst))
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Current record, if any fetch has succeeded yet.
    pub fn record(&self) -> Option<RateRecord> {
        self.inner.record.borrow().clone()
    }

    /// Observe record replacements.
    pub fn subscribe(&self) -> watch::Receiver<Option<RateRecord>> {
        self.inner.record.subscribe()
    }

    /// Observe the outcome of every cycle, including those run by the
    /// scheduler. A `Failed` value means the chain has halted.
    pub fn subscribe_outcomes(&self) -> watch::Receiver<Option<CycleOutcome>> {
        self.inner.outcome.subscribe()
    }

    /// Run one fetch cycle.
    ///
    /// On success the record is replaced and, if polling is enabled at that
    /// moment, one further cycle is scheduled after the current interval. On
    /// failure nothing is replaced or scheduled.
    pub fn fetch_once(&self) -> BoxFuture<'static, CycleOutcome> {
        let this = self.clone();
        async move { this.run_cycle().await }.boxed()
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let outcome = self.refresh().await;
        self.inner.outcome.send_replace(Some(outcome.clone()));
        outcome
    }

    async fn refresh(&self) -> CycleOutcome {
        let start = Instant::now();
        let inner = &self.inner;

        match inner.transport.get_json(&inner.endpoint).await {
            Ok(body) => {
                let latency_ms = start.elapsed().as_millis() as u32;
                inner.record.send_replace(Some(RateRecord(body)));

                let rescheduled = self.is_polling();
                if rescheduled {
                    let next = self.clone();
                    inner.scheduler.schedule(
                        self.interval(),
                        async move {
                            next.fetch_once().await;
                        }
                        .boxed(),
                    );
                }

                tracing::debug!(
                    endpoint = %inner.endpoint,
                    latency_ms,
                    rescheduled,
                    "Query rate refreshed"
                );
                CycleOutcome::Refreshed {
                    latency_ms,
                    rescheduled,
                }
            }
            Err(error) => {
                tracing::warn!(
                    endpoint = %inner.endpoint,
                    error = %error,
                    "Query rate fetch failed, polling chain halted"
                );
                CycleOutcome::Failed { error }
            }
        }
    }
}

/// Path and query of the statistics endpoint.
pub fn rate_endpoint(path_prefix: &str, statistic_type: &str) -> String {
    format!(
        "{}/services/statistics?type={}",
        path_prefix.trim_end_matches('/'),
        urlencoding::encode(statistic_type)
    )
}
