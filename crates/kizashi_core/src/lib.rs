//! Core data types for the Kizashi publishing pipeline.
//!
//! This crate provides the records that flow between pipeline stages and the
//! [`TextBudget`] used to fit prioritized segments into a platform's
//! character limit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod budget;
mod candidate;
mod record;
mod request;
mod segment;
mod source;

pub use budget::{ComposedPost, TextBudget, char_len, truncate_with_ellipsis};
pub use candidate::{Candidate, CandidateBuilder, CandidateBuilderError};
pub use record::{PostId, PostReceipt, PublishRecord};
pub use request::{
    GenerationRequest, GenerationRequestBuilder, GenerationRequestBuilderError, GenerationResult,
};
pub use segment::Segment;
pub use source::SourceDescriptor;
