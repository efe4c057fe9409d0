//! Validation for candidates that did not come through the parser.

use crate::canonical_url;
use kizashi_core::Candidate;
use kizashi_error::{ValidationError, ValidationErrorKind};

/// Check a candidate built elsewhere (a JSON file, a test fixture) and
/// rewrite its url to the canonical dedup key.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the title is blank or the url is not
/// an absolute http(s) URL with a host.
///
/// # Examples
///
/// ```
/// use kizashi_core::CandidateBuilder;
/// use kizashi_parse::validate_candidate;
///
/// let candidate = CandidateBuilder::default()
///     .url("https://example.com")
///     .title("Agents")
///     .build()
///     .unwrap();
/// assert_eq!(validate_candidate(candidate).unwrap().key(), "https://example.com/");
///
/// let broken = CandidateBuilder::default()
///     .url("ftp://example.com/a")
///     .title("Agents")
///     .build()
///     .unwrap();
/// assert!(validate_candidate(broken).is_err());
/// ```
pub fn validate_candidate(candidate: Candidate) -> Result<Candidate, ValidationError> {
    if candidate.title().trim().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::MissingField(
            "title".to_string(),
        )));
    }
    let url = canonical_url(candidate.url())?;
    Ok(candidate.with_url(url))
}
