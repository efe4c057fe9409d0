//! Discovered content items.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A discovered content item eligible for selection and publication.
///
/// The url is the unique key used by the dedup ledger. Candidates are built
/// by content sources; the parser only emits candidates whose url has
/// already been validated.
///
/// # Examples
///
/// ```
/// use kizashi_core::CandidateBuilder;
///
/// let candidate = CandidateBuilder::default()
///     .url("https://example.com/agents")
///     .title("Agents everywhere")
///     .summary("Autonomous agents move into the enterprise.")
///     .build()
///     .unwrap();
///
/// assert_eq!(candidate.key(), "https://example.com/agents");
/// assert!(candidate.signal().is_none());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Candidate {
    /// Canonical link, also the dedup key.
    url: String,

    /// Headline.
    title: String,

    /// Short summary of the item.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    summary: Option<String>,

    /// Longer body text.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    content: Option<String>,

    /// Theme or category tag.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    theme: Option<String>,

    /// Publication that carried the item.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    source: Option<String>,

    /// Why the item was clipped.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    reason: Option<String>,

    /// Forward-looking signal drawn from the item.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    signal: Option<String>,

    /// One-line takeaway, filled in during enrichment.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    key_point: Option<String>,

    /// Original publication time, when the source reported one.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    published_at: Option<NaiveDateTime>,

    /// When the pipeline first saw the item.
    #[builder(default = "Utc::now()")]
    #[serde(default = "Utc::now")]
    discovered_at: DateTime<Utc>,
}

impl Candidate {
    /// Dedup key for this candidate.
    pub fn key(&self) -> &str {
        &self.url
    }

    /// Replace the url, e.g. with its canonical form.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the summary and signal with localized values.
    pub fn localize(mut self, summary: Option<String>, signal: Option<String>) -> Self {
        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            self.summary = Some(summary);
        }
        if let Some(signal) = signal.filter(|s| !s.trim().is_empty()) {
            self.signal = Some(signal);
        }
        self
    }

    /// Replace the summary and key point with enriched values.
    pub fn enrich(mut self, summary: Option<String>, key_point: Option<String>) -> Self {
        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            self.summary = Some(summary);
        }
        if let Some(key_point) = key_point.filter(|s| !s.trim().is_empty()) {
            self.key_point = Some(key_point);
        }
        self
    }
}
