//! Generator output parsing errors.

/// Kinds of failures when interpreting generator output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ParseErrorKind {
    /// No JSON value could be located in the response
    #[display("No JSON found in response (length: {})", _0)]
    NoJson(usize),
    /// JSON was found but did not match the expected shape
    #[display("Malformed response: {}", _0)]
    Malformed(String),
    /// A ranking referred to a candidate that does not exist
    #[display("Index {} out of range for {} candidates", index, len)]
    OutOfRange {
        /// The 1-based index the generator produced
        index: usize,
        /// Number of candidates offered
        len: usize,
    },
}

/// Parse error with location tracking.
///
/// Parse errors never abort a cycle; callers fall back to a deterministic
/// default.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Parse Error: {} at line {} in {}", kind, line, file)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ParseError {
    /// Create a new ParseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ParseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
