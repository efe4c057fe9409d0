//! Error types for the Kizashi pipeline.
//!
//! This crate provides the error taxonomy shared by every Kizashi crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Upstream (generative backend) failures additionally carry a
//! [`FailureClass`], the closed classifier the retry logic branches on.
//!
//! # Examples
//!
//! ```
//! use kizashi_error::{FailureClass, KizashiResult, UpstreamError};
//!
//! fn call_backend() -> KizashiResult<String> {
//!     Err(UpstreamError::new(FailureClass::RateLimited, "quota exhausted"))?
//! }
//!
//! let err = call_backend().unwrap_err();
//! assert!(!err.is_fatal());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod failure;
mod parse;
mod publish;
mod storage;
mod upstream;
mod validation;

pub use config::ConfigError;
pub use error::{KizashiError, KizashiErrorKind, KizashiResult};
pub use failure::{FailureClass, RetryableError};
pub use parse::{ParseError, ParseErrorKind};
pub use publish::{PublishError, PublishErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use upstream::UpstreamError;
pub use validation::{ValidationError, ValidationErrorKind};
