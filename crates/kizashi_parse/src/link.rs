//! URL cleaning and validation.

use kizashi_error::{ValidationError, ValidationErrorKind};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[[^\]]*\]\(\s*([^)\s]+)\s*\)$").expect("Valid markdown link regex")
});

const LEADING: &[&str] = &["**", "*", "<", "(", "[", "：", ":", "|"];
const TRAILING: &[&str] = &["**", "*", ">", ")", "]", "|", "。", "、", ",", "."];

/// Strip the decoration models wrap around links.
///
/// Removes markdown emphasis, angle brackets, parentheses, stray colons and
/// trailing punctuation, and unwraps `[text](url)` links. Cleaning never
/// invents missing parts: an unusable value stays unusable and fails
/// [`validate_url`].
///
/// # Examples
///
/// ```
/// use kizashi_parse::clean_url;
///
/// assert_eq!(clean_url("**https://example.com/a**。"), "https://example.com/a");
/// assert_eq!(clean_url("[記事](https://example.com/b)"), "https://example.com/b");
/// assert_eq!(clean_url("example.com"), "example.com");
/// ```
pub fn clean_url(raw: &str) -> String {
    let mut current = raw.trim();

    if let Some(inner) = MARKDOWN_LINK.captures(current).and_then(|c| c.get(1)) {
        current = inner.as_str();
    }

    loop {
        let before = current;
        current = current.trim();
        if let Some(rest) = LEADING.iter().find_map(|p| current.strip_prefix(p)) {
            current = rest;
        }
        if let Some(rest) = TRAILING.iter().find_map(|s| current.strip_suffix(s)) {
            current = rest;
        }
        if current == before {
            break;
        }
    }

    current.to_string()
}

/// Accept only absolute http(s) URLs with a non-empty host.
///
/// # Errors
///
/// Returns a [`ValidationErrorKind::InvalidUrl`] naming the reason.
///
/// # Examples
///
/// ```
/// use kizashi_parse::validate_url;
///
/// assert!(validate_url("https://example.com/a").is_ok());
/// assert!(validate_url("ftp://example.com/a").is_err());
/// assert!(validate_url("example.com/a").is_err());
/// ```
pub fn validate_url(candidate: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: &str| {
        ValidationError::new(ValidationErrorKind::InvalidUrl {
            url: candidate.to_string(),
            reason: reason.to_string(),
        })
    };

    let parsed = Url::parse(candidate).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid("missing host")),
    }
}

/// Clean, validate and normalize a raw link into the form used as the
/// dedup key.
///
/// Every path that produces candidates goes through here, so the same link
/// always yields the same key.
///
/// # Errors
///
/// Returns a [`ValidationErrorKind::InvalidUrl`] when the cleaned value is
/// not an absolute http(s) URL with a host.
///
/// # Examples
///
/// ```
/// use kizashi_parse::canonical_url;
///
/// assert_eq!(canonical_url("<https://Example.com>").unwrap(), "https://example.com/");
/// assert!(canonical_url("not a url").is_err());
/// ```
pub fn canonical_url(raw: &str) -> Result<String, ValidationError> {
    validate_url(&clean_url(raw)).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_decoration_is_peeled() {
        assert_eq!(clean_url(" ：<https://example.com/x>, "), "https://example.com/x");
        assert_eq!(clean_url("(**https://example.com/y**)"), "https://example.com/y");
    }

    #[test]
    fn test_clean_leaves_bare_values_alone() {
        assert_eq!(clean_url("https://example.com/path?q=1"), "https://example.com/path?q=1");
    }
}
