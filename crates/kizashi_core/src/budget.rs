//! Fitting prioritized segments into a hard character budget.
//!
//! All lengths are counted in Unicode scalar values (codepoints), so a
//! truncation never splits a multi-byte character. The ellipsis counts
//! toward the budget.

use crate::Segment;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Number of codepoints in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Shorten `text` to at most `limit` codepoints, ending with `ellipsis` when
/// anything was removed.
///
/// When `limit` cannot hold the ellipsis itself, the text is cut without one.
///
/// # Examples
///
/// ```
/// use kizashi_core::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("未来の兆し", 3, "…"), "未来…");
/// assert_eq!(truncate_with_ellipsis("short", 10, "…"), "short");
/// assert_eq!(truncate_with_ellipsis("abc", 0, "…"), "");
/// ```
pub fn truncate_with_ellipsis(text: &str, limit: usize, ellipsis: &str) -> String {
    if char_len(text) <= limit {
        return text.to_string();
    }
    let ellipsis_len = char_len(ellipsis);
    if limit <= ellipsis_len {
        return text.chars().take(limit).collect();
    }
    let mut out: String = text.chars().take(limit - ellipsis_len).collect();
    out.push_str(ellipsis);
    out
}

/// Character budget for one platform.
///
/// # Examples
///
/// ```
/// use kizashi_core::{Segment, TextBudget};
///
/// let budget = TextBudget::new(50);
/// let text = budget.fit(&[
///     Segment::required("H", 0),
///     Segment::required("Title", 0),
///     Segment::optional("lorem ".repeat(50), 1, 20),
///     Segment::optional("F", 2, 1),
/// ]);
///
/// assert!(text.chars().count() <= 50);
/// assert!(text.starts_with("H\n\nTitle"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TextBudget {
    /// Hard ceiling in codepoints.
    max_length: usize,
    /// Joins emitted segments.
    separator: String,
    /// Marks truncated text.
    ellipsis: String,
}

impl Default for TextBudget {
    fn default() -> Self {
        Self::new(280)
    }
}

impl TextBudget {
    /// Budget with the default blank-line separator and `…` ellipsis.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            separator: "\n\n".to_string(),
            ellipsis: "…".to_string(),
        }
    }

    /// Replace the separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Replace the ellipsis.
    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = ellipsis.into();
        self
    }

    /// Fit `segments` into the budget, preserving their order in the output.
    ///
    /// Required segments go in first. If they alone overflow, the
    /// lowest-priority required segments are shortened and no optional
    /// segment is considered. Otherwise optional segments are added in
    /// priority order whenever the space left is at least their
    /// `minimum_length`. A final guard cuts the result to `max_length - 1`
    /// codepoints plus the ellipsis if it still overflows.
    pub fn fit(&self, segments: &[Segment]) -> String {
        let mut slots: Vec<Option<String>> = segments
            .iter()
            .map(|seg| {
                (seg.is_required() && !seg.text().is_empty()).then(|| seg.text().clone())
            })
            .collect();

        if self.measure(&slots) > self.max_length {
            self.shrink_required(segments, &mut slots);
            return self.guard(self.join(&slots));
        }

        let mut optional: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, seg)| !seg.is_required() && !seg.text().is_empty())
            .map(|(i, _)| i)
            .collect();
        optional.sort_by_key(|&i| *segments[i].priority());

        let ellipsis_len = char_len(&self.ellipsis);
        for i in optional {
            let segment = &segments[i];
            let separator = if slots.iter().any(Option::is_some) {
                char_len(&self.separator)
            } else {
                0
            };
            let leftover = self
                .max_length
                .saturating_sub(self.measure(&slots) + separator);

            if leftover == 0 || leftover < *segment.minimum_length() {
                continue;
            }
            // A cut that leaves only the ellipsis carries no content.
            if char_len(segment.text()) > leftover && leftover <= ellipsis_len {
                continue;
            }
            slots[i] = Some(truncate_with_ellipsis(
                segment.text(),
                leftover,
                &self.ellipsis,
            ));
        }

        self.guard(self.join(&slots))
    }

    /// Shorten required segments, lowest priority first, until they fit or
    /// every one is down to a single codepoint plus the ellipsis.
    fn shrink_required(&self, segments: &[Segment], slots: &mut [Option<String>]) {
        let floor = char_len(&self.ellipsis) + 1;
        let mut order: Vec<usize> = (0..slots.len()).filter(|&i| slots[i].is_some()).collect();
        order.sort_by(|&a, &b| {
            segments[b]
                .priority()
                .cmp(segments[a].priority())
                .then(b.cmp(&a))
        });

        for i in order {
            let current = self.measure(slots);
            if current <= self.max_length {
                break;
            }
            let Some(text) = slots[i].as_deref() else {
                continue;
            };
            let len = char_len(text);
            if len <= floor {
                continue;
            }
            let target = len.saturating_sub(current - self.max_length).max(floor);
            let shortened = truncate_with_ellipsis(text, target, &self.ellipsis);
            slots[i] = Some(shortened);
        }
    }

    fn measure(&self, slots: &[Option<String>]) -> usize {
        let (count, chars) = slots
            .iter()
            .flatten()
            .fold((0usize, 0usize), |(count, chars), text| {
                (count + 1, chars + char_len(text))
            });
        chars + char_len(&self.separator) * count.saturating_sub(1)
    }

    fn join(&self, slots: &[Option<String>]) -> String {
        slots
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    fn guard(&self, text: String) -> String {
        if char_len(&text) > self.max_length {
            truncate_with_ellipsis(&text, self.max_length, &self.ellipsis)
        } else {
            text
        }
    }
}

/// Ordered segments awaiting a budget.
///
/// # Examples
///
/// ```
/// use kizashi_core::{ComposedPost, Segment, TextBudget};
///
/// let post = ComposedPost::new()
///     .with(Segment::required("Title", 0))
///     .with(Segment::optional("Summary text", 1, 5));
///
/// assert_eq!(post.render(&TextBudget::new(280)), "Title\n\nSummary text");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPost {
    segments: Vec<Segment>,
}

impl ComposedPost {
    /// Empty post.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment.
    pub fn with(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Segments in output order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Render through `budget`.
    pub fn render(&self, budget: &TextBudget) -> String {
        budget.fit(&self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_counts_separators_between_emitted_slots() {
        let budget = TextBudget::new(100);
        let slots = vec![Some("ab".to_string()), None, Some("cd".to_string())];
        assert_eq!(budget.measure(&slots), 6);
        assert_eq!(budget.join(&slots), "ab\n\ncd");
    }

    #[test]
    fn test_guard_only_cuts_overflow() {
        let budget = TextBudget::new(4);
        assert_eq!(budget.guard("abcd".to_string()), "abcd");
        assert_eq!(budget.guard("abcde".to_string()), "abc…");
    }
}
