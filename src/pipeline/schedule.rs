//! Periodic check scheduling.
//!
//! The first check starts as soon as the scheduler runs, then one per
//! interval. Missed ticks are skipped rather than replayed, and a tick that
//! arrives while a check is still running is dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pipeline::check::Checker;

/// Runs a [`Checker`] on a fixed interval.
pub struct Scheduler {
    checker: Arc<Checker>,
    interval: Duration,
    running: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(checker: Arc<Checker>, interval: Duration) -> Self {
        Self {
            checker,
            interval,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Start a check in the background unless one is already running.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        let Ok(guard) = Arc::clone(&self.running).try_lock_owned() else {
            log::warn!("Previous gift card check still running; skipping this tick");
            return None;
        };

        let checker = Arc::clone(&self.checker);
        Some(tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = checker.run_once().await {
                log::error!("Scheduled check failed: {}", e);
            }
        }))
    }

    /// Trigger checks every interval until `shutdown` completes.
    ///
    /// Shutdown is polled before the ticker, so a completed shutdown never
    /// starts another check. A check still in flight at shutdown is aborted. Returns the number of
    /// checks started.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> usize {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut started = 0;
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    log::info!("Shutdown requested; stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    if let Some(handle) = self.trigger() {
                        started += 1;
                        in_flight = Some(handle);
                    }
                }
            }
        }

        if let Some(handle) = in_flight.filter(|h| !h.is_finished()) {
            handle.abort();
        }
        started
    }
}
