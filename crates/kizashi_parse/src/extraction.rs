//! Utilities for extracting structured data from model responses.
//!
//! Model responses often wrap JSON in markdown code fences or surround it
//! with explanation. These helpers locate the JSON value before decoding.

use kizashi_error::{ParseError, ParseErrorKind};
use serde::de::DeserializeOwned;

/// Extract JSON from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. A fenced block labelled `json`
/// 2. Any fenced block
/// 3. The first balanced `{...}` or `[...]`, whichever opens first
///
/// # Errors
///
/// Returns [`ParseErrorKind::NoJson`] if no candidate value is found.
///
/// # Examples
///
/// ```
/// use kizashi_parse::extract_json;
///
/// let response = "Here is the ranking:\n```json\n{\"top\": []}\n```\nThanks!";
/// assert_eq!(extract_json(response).unwrap(), "{\"top\": []}");
/// ```
pub fn extract_json(response: &str) -> Result<String, ParseError> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }
    if let Some(json) = extract_from_code_block(response, "") {
        if json.starts_with('{') || json.starts_with('[') {
            return Ok(json);
        }
    }

    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    let found = match (bracket_pos, brace_pos) {
        (Some(b), Some(c)) if b < c => extract_balanced(response, '[', ']')
            .or_else(|| extract_balanced(response, '{', '}')),
        (Some(_), None) => extract_balanced(response, '[', ']'),
        _ => extract_balanced(response, '{', '}')
            .or_else(|| extract_balanced(response, '[', ']')),
    };

    found.ok_or_else(|| {
        tracing::warn!(
            response_length = response.len(),
            "No JSON found in model response"
        );
        ParseError::new(ParseErrorKind::NoJson(response.len()))
    })
}

/// Extract and decode JSON into `T`.
///
/// # Errors
///
/// Returns [`ParseErrorKind::NoJson`] when nothing JSON-like is present and
/// [`ParseErrorKind::Malformed`] when decoding fails.
///
/// # Examples
///
/// ```
/// use kizashi_parse::parse_json;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Digest { summary: String }
///
/// let digest: Digest = parse_json("Sure! {\"summary\": \"ok\"}").unwrap();
/// assert_eq!(digest.summary, "ok");
/// ```
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, ParseError> {
    let json = extract_json(response)?;
    serde_json::from_str(&json).map_err(|e| {
        tracing::warn!(error = %e, "Model response JSON did not match expected shape");
        ParseError::new(ParseErrorKind::Malformed(e.to_string()))
    })
}

/// Content of the first fenced block, optionally requiring a language tag.
///
/// An unterminated fence (truncated response) yields everything after it.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let fence = format!("```{}", language);
    let start = response.find(&fence)?;
    let mut content_start = start + fence.len();

    if language.is_empty() {
        // Skip a language tag on the fence line.
        content_start = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
    }

    let body = &response[content_start..];
    let content = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    Some(content.trim().to_string())
}

/// Content between balanced delimiters, honoring JSON string escapes.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_ignores_braces_in_strings() {
        let text = r#"noise {"a": "}{", "b": {"c": 1}} trailing"#;
        assert_eq!(
            extract_balanced(text, '{', '}').unwrap(),
            r#"{"a": "}{", "b": {"c": 1}}"#
        );
    }

    #[test]
    fn test_unterminated_fence_returns_remainder() {
        let text = "```json\n{\"a\": 1}";
        assert_eq!(extract_from_code_block(text, "json").unwrap(), "{\"a\": 1}");
    }
}
