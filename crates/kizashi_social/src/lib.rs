//! Publishers for Kizashi.
//!
//! Each publisher implements [`Publisher`](kizashi_interface::Publisher) and
//! rejects text longer than its platform limit instead of truncating it; the
//! budgeter is responsible for fitting text beforehand.
//!
//! - [`DemoPublisher`]: logs posts and hands out deterministic ids
//! - [`BlueskyPublisher`]: posts over the AT protocol XRPC API

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bluesky;
mod demo;
mod facets;

pub use bluesky::BlueskyPublisher;
pub use demo::DemoPublisher;
pub use facets::{LinkFacet, link_facets};

use kizashi_core::char_len;
use kizashi_error::{PublishError, PublishErrorKind};

/// Reject `text` if it exceeds `max_length` codepoints.
pub fn ensure_fits(text: &str, max_length: usize) -> Result<(), PublishError> {
    let length = char_len(text);
    if length > max_length {
        return Err(PublishError::new(PublishErrorKind::TooLong {
            length,
            max_length,
        }));
    }
    Ok(())
}
