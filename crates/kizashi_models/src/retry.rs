//! Backoff schedule for upstream calls.

use derive_getters::Getters;
use std::time::Duration;
use tokio_retry2::strategy::jitter;

/// Exponential backoff settings for one logical generation call.
///
/// `max_retries` bounds the total number of calls to the primary backend.
/// Between attempt `n` and `n + 1` the client sleeps
/// `base_delay * 2^(n-1)`, capped at `max_delay`.
///
/// # Examples
///
/// ```
/// use kizashi_models::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(Duration::from_millis(500), 3);
/// assert_eq!(
///     policy.delays().collect::<Vec<_>>(),
///     vec![Duration::from_millis(500), Duration::from_millis(1000)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RetryPolicy {
    /// Delay before the second attempt.
    base_delay: Duration,
    /// Total attempts against the primary backend.
    max_retries: u32,
    /// Ceiling for any single delay.
    max_delay: Duration,
    /// Randomize each delay.
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 3)
    }
}

impl RetryPolicy {
    /// Policy with a 60 second delay ceiling and no jitter.
    ///
    /// A `max_retries` of zero is treated as one attempt.
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries: max_retries.max(1),
            max_delay: Duration::from_secs(60),
            jitter: false,
        }
    }

    /// Replace the delay ceiling.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sleep durations between consecutive attempts.
    ///
    /// Yields `max_retries - 1` values.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let base = self.base_delay;
        let max_delay = self.max_delay;
        let use_jitter = self.jitter;

        (1..self.max_retries).map(move |attempt| {
            let factor = 2u32.saturating_pow(attempt - 1);
            let delay = base.saturating_mul(factor).min(max_delay);
            if use_jitter { jitter(delay) } else { delay }
        })
    }
}
