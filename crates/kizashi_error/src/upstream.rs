//! Generative backend error types.

use crate::{FailureClass, RetryableError};

/// Failure reported by a generative backend.
///
/// Retryable classes (rate limit, server error, timeout) map to the
/// retryable upstream family; [`FailureClass::BadRequest`] is the fatal
/// family and aborts the cycle that observed it.
///
/// # Examples
///
/// ```
/// use kizashi_error::{FailureClass, UpstreamError};
///
/// let err = UpstreamError::from_status(503, "Service Unavailable");
/// assert_eq!(err.class, FailureClass::ServerError);
/// assert!(format!("{}", err).contains("server error"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error ({}): {} at line {} in {}", class, message, line, file)]
pub struct UpstreamError {
    /// Classification used by retry and fallback logic
    pub class: FailureClass,
    /// Error message from the backend or transport
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with an explicit class.
    #[track_caller]
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            class,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error classified by HTTP status code.
    #[track_caller]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureClass::from_status(status), message)
    }

    /// Create an error classified by inspecting its message.
    #[track_caller]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(FailureClass::from_message(&message), message)
    }

    /// Whether this error aborts the cycle.
    pub fn is_fatal(&self) -> bool {
        self.class.is_fatal()
    }
}

impl RetryableError for UpstreamError {
    fn failure_class(&self) -> FailureClass {
        self.class
    }
}
