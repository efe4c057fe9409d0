//! Trait definitions for the Kizashi publishing pipeline.
//!
//! The pipeline depends on four collaborators, each behind a trait so that
//! hosts and tests can inject their own implementations:
//! - [`GenerativeBackend`]: one text-completion service
//! - [`ContentSource`]: produces candidates for a source descriptor
//! - [`Publisher`]: posts finished text to a platform
//! - [`DedupStore`]: the append-only ledger of confirmed publishes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ContentSource, DedupStore, GenerativeBackend, Publisher};
