//! Fixed-interval trigger for pipeline cycles.

use crate::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

/// Fires a pipeline cycle every interval until shutdown.
///
/// A tick that arrives while the previous cycle is still running is
/// dropped and counted, never queued. On shutdown no new cycle starts and
/// the one in flight is awaited.
///
/// # Examples
///
/// ```
/// use kizashi_bot::Scheduler;
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new(Duration::from_secs(3600), true);
/// assert_eq!(scheduler.interval(), Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    run_on_start: bool,
}

impl Scheduler {
    /// Scheduler ticking every `interval`, optionally firing immediately.
    pub fn new(interval: Duration, run_on_start: bool) -> Self {
        Self {
            interval,
            run_on_start,
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Drive `pipeline` until `shutdown` turns true or its sender is dropped.
    #[instrument(skip_all, fields(interval_secs = self.interval.as_secs()))]
    pub async fn run(&self, pipeline: Arc<Pipeline>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.run_on_start {
            // The first tick completes immediately.
            ticker.tick().await;
        }

        info!(run_on_start = self.run_on_start, "Scheduler started");
        let mut cycles = JoinSet::new();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    while cycles.try_join_next().is_some() {}
                    let pipeline = pipeline.clone();
                    cycles.spawn(async move {
                        match pipeline.try_run_cycle().await {
                            None => {
                                pipeline.metrics().record_skipped_tick();
                                warn!("Previous cycle still running, skipping tick");
                            }
                            Some(Ok(summary)) => debug!(%summary, "Tick handled"),
                            Some(Err(_)) => debug!("Tick ended with an aborted cycle"),
                        }
                        let snapshot = pipeline.metrics().snapshot();
                        debug!(?snapshot, "Pipeline metrics");
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if !cycles.is_empty() {
            info!("Shutdown requested, waiting for the running cycle");
        }
        while let Some(joined) = cycles.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Cycle task ended abnormally");
            }
        }

        let snapshot = pipeline.metrics().snapshot();
        info!(
            cycles_run = snapshot.cycles_run,
            cycles_failed = snapshot.cycles_failed,
            ticks_skipped = snapshot.ticks_skipped,
            posts_published = snapshot.posts_published,
            "Scheduler stopped"
        );
    }
}
