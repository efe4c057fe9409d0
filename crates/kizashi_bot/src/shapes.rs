//! Post layouts expressed as budgeter segments.

use chrono::NaiveDate;
use kizashi_core::{Candidate, ComposedPost, Segment};
use serde::{Deserialize, Serialize};

const SIGNAL_LABEL: &str = "🔮 未来の兆し: ";

/// Layout used to turn a candidate into post text.
///
/// Both shapes go through the same [`TextBudget`](kizashi_core::TextBudget);
/// they differ only in the segments they produce.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use kizashi_bot::PostShape;
/// use kizashi_core::{CandidateBuilder, TextBudget};
///
/// let candidate = CandidateBuilder::default()
///     .url("https://example.com/a")
///     .title("Agents at work")
///     .build()
///     .unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
///
/// let text = PostShape::Ranked
///     .compose(&candidate, 1, date)
///     .render(&TextBudget::new(280));
/// assert_eq!(text, "📰 TOP1 (03/14)\n\n【Agents at work】\n\n🔗 https://example.com/a");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostShape {
    /// Title, summary and the "future signal" note.
    #[default]
    Signal,
    /// Numbered header, bracketed title, summary, key point and link.
    Ranked,
}

impl PostShape {
    /// Segments for `candidate` at position `rank` (1-based) on `date`.
    pub fn compose(&self, candidate: &Candidate, rank: usize, date: NaiveDate) -> ComposedPost {
        match self {
            PostShape::Signal => signal(candidate),
            PostShape::Ranked => ranked(candidate, rank, date),
        }
    }
}

fn signal(candidate: &Candidate) -> ComposedPost {
    let mut post = ComposedPost::new().with(Segment::required(candidate.title().as_str(), 0));
    if let Some(summary) = non_blank(candidate.summary()) {
        post.push(Segment::optional(summary, 1, 20));
    }
    if let Some(signal) = non_blank(candidate.signal()) {
        post.push(Segment::optional(format!("{}{}", SIGNAL_LABEL, signal), 2, 10));
    }
    post
}

fn ranked(candidate: &Candidate, rank: usize, date: NaiveDate) -> ComposedPost {
    // Header and link outrank the title, so an oversized title is what gets cut.
    let mut post = ComposedPost::new()
        .with(Segment::required(
            format!("📰 TOP{} ({})", rank, date.format("%m/%d")),
            0,
        ))
        .with(Segment::required(format!("【{}】", candidate.title()), 2));
    if let Some(summary) = non_blank(candidate.summary()) {
        post.push(Segment::optional(format!("📝 {}", summary), 3, 20));
    }
    if let Some(key_point) = non_blank(candidate.key_point()) {
        post.push(Segment::optional(format!("💡 {}", key_point), 4, 10));
    }
    post.push(Segment::required(format!("🔗 {}", candidate.url()), 1));
    post
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
