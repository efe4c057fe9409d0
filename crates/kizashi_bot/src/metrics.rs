//! Counters for pipeline activity.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for the pipeline and its scheduler.
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    inner: Arc<PipelineMetricsInner>,
}

#[derive(Debug)]
struct PipelineMetricsInner {
    cycles_run: AtomicU64,
    cycles_failed: AtomicU64,
    ticks_skipped: AtomicU64,
    posts_published: AtomicU64,
    publish_failures: AtomicU64,
    last_success: parking_lot::Mutex<Option<Instant>>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PipelineMetricsInner {
                cycles_run: AtomicU64::new(0),
                cycles_failed: AtomicU64::new(0),
                ticks_skipped: AtomicU64::new(0),
                posts_published: AtomicU64::new(0),
                publish_failures: AtomicU64::new(0),
                last_success: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Records a cycle start.
    pub fn record_cycle(&self) {
        self.inner.cycles_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cycle that completed.
    pub fn record_cycle_success(&self) {
        *self.inner.last_success.lock() = Some(Instant::now());
    }

    /// Records a cycle that aborted.
    pub fn record_cycle_failure(&self) {
        self.inner.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a tick dropped because a cycle was still running.
    pub fn record_skipped_tick(&self) {
        self.inner.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a confirmed publish.
    pub fn record_post(&self) {
        self.inner.posts_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejected publish.
    pub fn record_publish_failure(&self) {
        self.inner.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the number of cycles started.
    pub fn cycles_run(&self) -> u64 {
        self.inner.cycles_run.load(Ordering::Relaxed)
    }

    /// Gets the number of cycles that aborted.
    pub fn cycles_failed(&self) -> u64 {
        self.inner.cycles_failed.load(Ordering::Relaxed)
    }

    /// Gets the number of skipped ticks.
    pub fn ticks_skipped(&self) -> u64 {
        self.inner.ticks_skipped.load(Ordering::Relaxed)
    }

    /// Gets the number of confirmed publishes.
    pub fn posts_published(&self) -> u64 {
        self.inner.posts_published.load(Ordering::Relaxed)
    }

    /// Gets the number of rejected publishes.
    pub fn publish_failures(&self) -> u64 {
        self.inner.publish_failures.load(Ordering::Relaxed)
    }

    /// Gets time since the last completed cycle.
    pub fn time_since_success(&self) -> Option<std::time::Duration> {
        self.inner
            .last_success
            .lock()
            .map(|instant| instant.elapsed())
    }

    /// Creates a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_run: self.cycles_run(),
            cycles_failed: self.cycles_failed(),
            ticks_skipped: self.ticks_skipped(),
            posts_published: self.posts_published(),
            publish_failures: self.publish_failures(),
            seconds_since_success: self.time_since_success().map(|d| d.as_secs()),
        }
    }
}

/// Point-in-time view of [`PipelineMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Cycles started
    pub cycles_run: u64,
    /// Cycles aborted
    pub cycles_failed: u64,
    /// Ticks skipped because a cycle was still running
    pub ticks_skipped: u64,
    /// Confirmed publishes
    pub posts_published: u64,
    /// Rejected publishes
    pub publish_failures: u64,
    /// Seconds since the last completed cycle
    pub seconds_since_success: Option<u64>,
}
