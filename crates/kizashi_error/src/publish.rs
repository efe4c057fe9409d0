//! Publisher error types.

/// Kinds of publishing failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PublishErrorKind {
    /// Text exceeds the platform limit
    #[display("Text is {} characters, platform limit is {}", length, max_length)]
    TooLong {
        /// Length of the rejected text in codepoints
        length: usize,
        /// Platform maximum in codepoints
        max_length: usize,
    },
    /// Platform refused the post
    #[display("Post rejected: {}", _0)]
    Rejected(String),
    /// Credentials missing or refused
    #[display("Authentication failed: {}", _0)]
    Authentication(String),
    /// Network failure talking to the platform
    #[display("Transport failure: {}", _0)]
    Transport(String),
}

/// Publish error with location tracking.
///
/// A publish error is logged and the candidate stays unrecorded, so it is
/// eligible again in the next cycle.
///
/// # Examples
///
/// ```
/// use kizashi_error::{PublishError, PublishErrorKind};
///
/// let err = PublishError::new(PublishErrorKind::TooLong { length: 300, max_length: 280 });
/// assert!(format!("{}", err).contains("280"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    /// The kind of error that occurred
    pub kind: PublishErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl PublishError {
    /// Create a new PublishError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
