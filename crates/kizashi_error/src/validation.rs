//! Candidate validation error types.

/// Kinds of validation failures for discovered candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A required field was absent
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// URL lacks an http(s) scheme or a host
    #[display("Invalid URL '{}': {}", url, reason)]
    InvalidUrl {
        /// The offending value after cleaning
        url: String,
        /// Why it was rejected
        reason: String,
    },
    /// Date string matched no known format
    #[display("Unrecognized date: {}", _0)]
    InvalidDate(String),
}

/// Validation error with location tracking.
///
/// Validation errors are recovered locally: the offending record is dropped
/// and a diagnostic is logged.
///
/// # Examples
///
/// ```
/// use kizashi_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingField("url".to_string()));
/// assert!(format!("{}", err).contains("url"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
