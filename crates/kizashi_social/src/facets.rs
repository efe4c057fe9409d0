//! Link facets for Bluesky rich text.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s　<>"「」（）]+"#).expect("Valid link regex")
});

const TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '。', '、', '…'];

/// A link span in UTF-8 byte offsets, as the AT protocol expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkFacet {
    /// Offset of the first byte of the link.
    pub byte_start: usize,
    /// Offset one past the last byte of the link.
    pub byte_end: usize,
    /// The link target.
    pub uri: String,
}

/// Find every http(s) link in `text`.
///
/// Trailing sentence punctuation is not part of the link.
///
/// # Examples
///
/// ```
/// use kizashi_social::link_facets;
///
/// let text = "🔗 https://example.com/a。";
/// let facets = link_facets(text);
/// assert_eq!(facets[0].uri, "https://example.com/a");
/// assert_eq!(&text[facets[0].byte_start..facets[0].byte_end], "https://example.com/a");
/// ```
pub fn link_facets(text: &str) -> Vec<LinkFacet> {
    LINK_REGEX
        .find_iter(text)
        .filter_map(|m| {
            let uri = m.as_str().trim_end_matches(TRAILING);
            if uri.ends_with("://") {
                return None;
            }
            Some(LinkFacet {
                byte_start: m.start(),
                byte_end: m.start() + uri.len(),
                uri: uri.to_string(),
            })
        })
        .collect()
}
