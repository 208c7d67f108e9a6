//! One-shot timer scheduling.
//!
//! Components that re-enqueue themselves hand a boxed task and a delay to a
//! [`Scheduler`]. [`TokioScheduler`] spawns onto the running tokio runtime;
//! [`ManualScheduler`] only records what was scheduled so callers can
//! inspect pending timers and fire them by hand.

use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs a task once after a delay.
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once, `delay` from now. Must not block.
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>);
}

/// Scheduler backed by `tokio::spawn` and `tokio::time::sleep`.
///
/// Must be used from within a tokio runtime. Cancelling the token drops
/// every timer that has not fired yet; tasks already running are not
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    cancel_token: CancellationToken,
}

impl TokioScheduler {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self { cancel_token }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        let cancel_token = self.cancel_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Pending timer dropped on shutdown");
                }
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
    }
}

/// A timer recorded by [`ManualScheduler`].
struct PendingTimer {
    delay: Duration,
    task: BoxFuture<'static, ()>,
}

/// Scheduler that queues timers instead of running them.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<VecDeque<PendingTimer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays of all timers not yet fired, oldest first.
    pub fn pending(&self) -> Vec<Duration> {
        self.lock().iter().map(|t| t.delay).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Fire the oldest pending timer and wait for its task to finish.
    ///
    /// Returns the timer's delay, or `None` if nothing was pending.
    pub async fn run_next(&self) -> Option<Duration> {
        let timer = self.lock().pop_front()?;
        timer.task.await;
        Some(timer.delay)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PendingTimer>> {
        // Tasks run outside the lock; the queue is never left half-updated.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        self.lock().push_back(PendingTimer { delay, task });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_manual_scheduler_records_and_fires_in_order() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicU32::new(0));

        for ms in [100, 200] {
            let fired = Arc::clone(&fired);
            scheduler.schedule(
                Duration::from_millis(ms),
                async move {
                    fired.fetch_add(1, Ordering::SeqCst);
                }
                .boxed(),
            );
        }

        assert_eq!(
            scheduler.pending(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(
            scheduler.run_next().await,
            Some(Duration::from_millis(100))
        );
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_manual_scheduler_run_next_empty() {
        let scheduler = ManualScheduler::new();
        assert_eq!(scheduler.run_next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::default();
        let (tx, rx) = tokio::sync::oneshot::channel();

        scheduler.schedule(
            Duration::from_secs(5),
            async move {
                let _ = tx.send(());
            }
            .boxed(),
        );

        tokio::time::timeout(Duration::from_secs(6), rx)
            .await
            .expect("timer should fire before timeout")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel_drops_pending_timer() {
        let token = CancellationToken::new();
        let scheduler = TokioScheduler::new(token.clone());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        scheduler.schedule(
            Duration::from_secs(5),
            async move {
                let _ = tx.send(());
            }
            .boxed(),
        );
        token.cancel();

        // Sender is dropped together with the cancelled task.
        assert!(rx.await.is_err());
    }
}
