//! Top-level error wrapper types.

use crate::{
    ConfigError, ParseError, PublishError, StorageError, UpstreamError, ValidationError,
};

/// Every error family the pipeline can surface.
///
/// # Examples
///
/// ```
/// use kizashi_error::{KizashiError, ConfigError};
///
/// let err: KizashiError = ConfigError::new("missing [schedule]").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KizashiErrorKind {
    /// Malformed candidate or URL
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Generative backend failure
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Unparseable generator output
    #[from(ParseError)]
    Parse(ParseError),
    /// Publisher rejected the post
    #[from(PublishError)]
    Publish(PublishError),
    /// Dedup ledger failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Kizashi error with kind discrimination.
///
/// # Examples
///
/// ```
/// use kizashi_error::{FailureClass, KizashiResult, UpstreamError};
///
/// fn might_fail() -> KizashiResult<()> {
///     Err(UpstreamError::new(FailureClass::BadRequest, "unsupported parameter"))?
/// }
///
/// assert!(might_fail().unwrap_err().is_fatal());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Kizashi Error: {}", _0)]
pub struct KizashiError(Box<KizashiErrorKind>);

impl KizashiError {
    /// Create a new error from a kind.
    pub fn new(kind: KizashiErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KizashiErrorKind {
        &self.0
    }

    /// Whether this error must abort the current cycle.
    ///
    /// Only fatal upstream failures (malformed requests) qualify; every other
    /// family is recovered at candidate level.
    pub fn is_fatal(&self) -> bool {
        match self.kind() {
            KizashiErrorKind::Upstream(e) => e.is_fatal(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to KizashiErrorKind
impl<T> From<T> for KizashiError
where
    T: Into<KizashiErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Kizashi operations.
pub type KizashiResult<T> = std::result::Result<T, KizashiError>;
