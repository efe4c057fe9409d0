//! Retrying, fallback-aware generation client.

use crate::RetryPolicy;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use kizashi_core::{GenerationRequest, GenerationResult};
use kizashi_error::{FailureClass, KizashiResult, UpstreamError};
use kizashi_interface::GenerativeBackend;
use parking_lot::Mutex;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, info, instrument, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Generation client wrapping a primary backend and an optional fallback.
///
/// Each call to [`generate`](GenerationClient::generate) is one logical
/// call with its own attempt counter:
/// - retryable failures (rate limit, server error, timeout) are retried with
///   exponential backoff until [`RetryPolicy::max_retries`] attempts;
/// - a bad request is surfaced immediately and never retried;
/// - a not-found failure switches to the fallback backend for exactly one
///   attempt.
///
/// Backoff sleeps only suspend the calling task, so independent calls may run
/// concurrently.
#[derive(Clone)]
pub struct GenerationClient {
    primary: Arc<dyn GenerativeBackend>,
    fallback: Option<Arc<dyn GenerativeBackend>>,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("primary", &self.primary.model_name())
            .field("fallback", &self.fallback.as_ref().map(|b| b.model_name()))
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

impl GenerationClient {
    /// Client over `primary` with no fallback, timeout or rate limit.
    pub fn new(primary: Arc<dyn GenerativeBackend>, policy: RetryPolicy) -> Self {
        Self {
            primary,
            fallback: None,
            policy,
            timeout: None,
            limiter: None,
        }
    }

    /// Backend to try once when the primary reports not found.
    pub fn with_fallback(mut self, fallback: Arc<dyn GenerativeBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Per-attempt timeout. An attempt exceeding it is a retryable failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Limit outgoing calls to `requests_per_minute`. Zero disables the limit.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.limiter = NonZeroU32::new(requests_per_minute)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        self
    }

    /// Retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run one logical generation call.
    ///
    /// # Errors
    ///
    /// Returns the last [`UpstreamError`] once retries are exhausted, a fatal
    /// bad-request error straight away, or the fallback's error when the
    /// fallback attempt also fails.
    #[instrument(
        skip(self, request),
        fields(
            provider = self.primary.provider_name(),
            model = self.primary.model_name(),
            max_retries = self.policy.max_retries()
        )
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> KizashiResult<GenerationResult> {
        let attempts = AtomicU32::new(0);
        let last_failure: Mutex<Option<FailureClass>> = Mutex::new(None);

        let primary = Retry::spawn(self.policy.delays(), || {
            let attempts = &attempts;
            let last_failure = &last_failure;
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                match self.call(self.primary.as_ref(), request).await {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        *last_failure.lock() = Some(e.class);
                        if e.class.is_retryable() {
                            warn!(attempt, error = %e, "Retryable upstream failure");
                            Err(RetryError::Transient {
                                err: e,
                                retry_after: None,
                            })
                        } else {
                            warn!(attempt, error = %e, "Permanent upstream failure, not retrying");
                            Err(RetryError::Permanent(e))
                        }
                    }
                }
            }
        })
        .await;

        match primary {
            Ok(text) => {
                let attempts = attempts.load(Ordering::SeqCst);
                debug!(attempts, "Generation succeeded");
                Ok(GenerationResult::new(
                    text,
                    self.primary.model_name(),
                    attempts,
                    false,
                    *last_failure.lock(),
                ))
            }
            Err(e) if e.class.triggers_fallback() => {
                let attempts = attempts.load(Ordering::SeqCst);
                self.try_fallback(request, e, attempts).await
            }
            Err(e) => {
                warn!(
                    attempts = attempts.load(Ordering::SeqCst),
                    class = %e.class,
                    "Generation failed"
                );
                Err(e.into())
            }
        }
    }

    async fn try_fallback(
        &self,
        request: &GenerationRequest,
        primary_error: UpstreamError,
        attempts: u32,
    ) -> KizashiResult<GenerationResult> {
        let Some(fallback) = &self.fallback else {
            warn!(error = %primary_error, "Primary backend unavailable and no fallback configured");
            return Err(primary_error.into());
        };

        info!(
            primary = self.primary.model_name(),
            fallback = fallback.model_name(),
            "Primary backend unavailable, trying fallback"
        );

        // An override naming the unavailable model must not reach the fallback.
        let fallback_request = request.without_model();

        match self.call(fallback.as_ref(), &fallback_request).await {
            Ok(text) => Ok(GenerationResult::new(
                text,
                fallback.model_name(),
                attempts + 1,
                true,
                Some(primary_error.class),
            )),
            Err(e) => {
                warn!(error = %e, "Fallback backend failed");
                Err(e.into())
            }
        }
    }

    /// One backend call behind the rate limit and timeout.
    async fn call(
        &self,
        backend: &dyn GenerativeBackend,
        request: &GenerationRequest,
    ) -> Result<String, UpstreamError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, backend.generate(request))
                .await
                .map_err(|_| {
                    UpstreamError::new(
                        FailureClass::Timeout,
                        format!("{} timed out after {:?}", backend.provider_name(), timeout),
                    )
                })?,
            None => backend.generate(request).await,
        }
    }
}
