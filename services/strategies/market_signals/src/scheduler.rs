//! Interval scheduling for the background jobs
//!
//! Jobs are polled on a short tick and run when their interval has elapsed
//! since the last run. A run that overlaps the next due time delays it, runs
//! are never stacked.

use crate::log_schedule;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// Due-time bookkeeping for one job
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    started: Instant,
    last_run: Option<Instant>,
    run_on_start: bool,
}

impl Cadence {
    pub fn new(interval: Duration, run_on_start: bool) -> Self {
        Self {
            interval,
            started: Instant::now(),
            last_run: None,
            run_on_start,
        }
    }

    /// A zero interval disables the job
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => self.run_on_start || now.saturating_duration_since(self.started) >= self.interval,
        }
    }

    pub fn mark_run(&mut self, at: Instant) {
        self.last_run = Some(at);
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }
}

/// Drive `job` on `cadence` until the shutdown flag is set
///
/// Returns the number of completed runs.
pub async fn run_schedule<F, Fut>(
    name: &str,
    mut cadence: Cadence,
    poll: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut job: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    if !cadence.is_enabled() {
        info!("{} disabled", name);
        return 0;
    }

    let mut ticker = tokio::time::interval(poll.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                if cadence.is_due(now) {
                    log_schedule!("{} due, running", name);
                    cadence.mark_run(now);
                    job().await;
                    runs += 1;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("{} stopped after {} runs", name, runs);
    runs
}
