//! Budgeter input segments.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One field of a composed post.
///
/// Priority is ascending: `0` is the most important segment. Required
/// segments are always emitted (truncated if necessary); optional segments
/// are emitted only when at least `minimum_length` codepoints remain.
///
/// # Examples
///
/// ```
/// use kizashi_core::Segment;
///
/// let title = Segment::required("Agents everywhere", 0);
/// let summary = Segment::optional("Autonomous agents move in.", 1, 20);
///
/// assert!(title.is_required());
/// assert_eq!(*summary.minimum_length(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text.
    text: String,
    /// Inclusion order, lower first.
    priority: u32,
    /// Smallest truncated form worth emitting.
    minimum_length: usize,
    /// Whether the segment must appear.
    #[getter(skip)]
    required: bool,
}

impl Segment {
    /// Create a required segment.
    pub fn required(text: impl Into<String>, priority: u32) -> Self {
        Self {
            text: text.into(),
            priority,
            minimum_length: 0,
            required: true,
        }
    }

    /// Create an optional segment.
    pub fn optional(text: impl Into<String>, priority: u32, minimum_length: usize) -> Self {
        Self {
            text: text.into(),
            priority,
            minimum_length,
            required: false,
        }
    }

    /// Whether the segment must appear.
    pub fn is_required(&self) -> bool {
        self.required
    }
}
