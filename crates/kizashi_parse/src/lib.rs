//! Turning generator output into typed records.
//!
//! - [`CandidateParser`] extracts candidates from sectioned, labeled text
//! - [`canonical_url`] and [`validate_candidate`] gate every candidate key
//! - [`extract_json`] and [`parse_json`] pull structured answers out of
//!   free-form model responses

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod date;
mod extraction;
mod link;
mod parser;
mod validate;

pub use date::parse_date;
pub use extraction::{extract_json, parse_json};
pub use link::{canonical_url, clean_url, validate_url};
pub use parser::{CandidateParser, ParseReport};
pub use validate::validate_candidate;
