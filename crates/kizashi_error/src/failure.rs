//! Failure classification for upstream calls.

/// Closed classification of upstream failures.
///
/// Every transport or API error from a generative backend is mapped onto one
/// of these variants, and retry/fallback decisions branch on the variant
/// rather than on error strings.
///
/// # Examples
///
/// ```
/// use kizashi_error::FailureClass;
///
/// assert_eq!(FailureClass::from_status(429), FailureClass::RateLimited);
/// assert_eq!(FailureClass::from_message("Request timed out"), FailureClass::Timeout);
/// assert!(FailureClass::ServerError.is_retryable());
/// assert!(FailureClass::BadRequest.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FailureClass {
    /// Rate limit or quota signal
    #[display("rate limited")]
    RateLimited,
    /// Transient server-side failure
    #[display("server error")]
    ServerError,
    /// Request exceeded its timeout
    #[display("timeout")]
    Timeout,
    /// Model or backend unavailable
    #[display("not found")]
    NotFound,
    /// Malformed request (caller error)
    #[display("bad request")]
    BadRequest,
    /// Anything else
    #[display("other")]
    Other,
}

impl FailureClass {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            408 => FailureClass::Timeout,
            429 => FailureClass::RateLimited,
            404 => FailureClass::NotFound,
            400 | 401 | 403 | 413 | 422 => FailureClass::BadRequest,
            501 => FailureClass::Other,
            500..=599 => FailureClass::ServerError,
            _ => FailureClass::Other,
        }
    }

    /// Classify a transport error message.
    ///
    /// Used when no status code is available. Matching is case-insensitive
    /// and checks the classes in a fixed order, so a message mentioning both
    /// a quota and a timeout classifies as rate limited.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if any(&["429", "rate limit", "quota"]) {
            FailureClass::RateLimited
        } else if any(&[
            "500",
            "502",
            "503",
            "service unavailable",
            "internal server error",
        ]) {
            FailureClass::ServerError
        } else if any(&["timeout", "timed out"]) {
            FailureClass::Timeout
        } else if any(&["not found", "404", "does not exist"]) {
            FailureClass::NotFound
        } else if any(&["400", "bad request", "invalid request"]) {
            FailureClass::BadRequest
        } else {
            FailureClass::Other
        }
    }

    /// Whether a failure of this class should be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureClass::RateLimited | FailureClass::ServerError | FailureClass::Timeout
        )
    }

    /// Whether a failure of this class aborts the whole cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureClass::BadRequest)
    }

    /// Whether a failure of this class should switch to the fallback backend.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, FailureClass::NotFound)
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use kizashi_error::{FailureClass, RetryableError, UpstreamError};
///
/// let err = UpstreamError::new(FailureClass::ServerError, "503 Service Unavailable");
/// assert!(err.is_retryable());
/// assert_eq!(err.failure_class(), FailureClass::ServerError);
/// ```
pub trait RetryableError {
    /// Classification of this failure.
    fn failure_class(&self) -> FailureClass;

    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool {
        self.failure_class().is_retryable()
    }
}
