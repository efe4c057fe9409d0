//! Summary and key-point generation for ranked posts, and Japanese
//! localization for signal posts.

use kizashi_core::{Candidate, GenerationRequest, truncate_with_ellipsis};
use kizashi_error::KizashiResult;
use kizashi_models::GenerationClient;
use kizashi_parse::parse_json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Codepoints of body text sent to the model.
const BODY_LENGTH: usize = 2000;

#[derive(Debug, Deserialize)]
struct Enrichment {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    key_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Localization {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    signal: Option<String>,
}

/// Whether `text` contains any hiragana, katakana or CJK ideograph.
///
/// ```
/// use kizashi_bot::contains_japanese;
///
/// assert!(contains_japanese("AIエージェントが普及"));
/// assert!(!contains_japanese("Agents everywhere"));
/// ```
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}')
    })
}

/// Asks the generation client for a short summary and key point.
#[derive(Debug, Clone)]
pub struct Enricher {
    client: Arc<GenerationClient>,
}

impl Enricher {
    /// Enricher using `client`.
    pub fn new(client: Arc<GenerationClient>) -> Self {
        Self { client }
    }

    /// Fill in `summary` and `key_point`.
    ///
    /// An unparseable answer keeps the candidate as it is.
    ///
    /// # Errors
    ///
    /// Returns the upstream error when the call itself fails, so the caller
    /// can skip the candidate or abort the cycle.
    #[instrument(skip(self, candidate), fields(key = %candidate.key()))]
    pub async fn enrich(&self, candidate: Candidate) -> KizashiResult<Candidate> {
        let request =
            GenerationRequest::prompt_only(enrichment_prompt(&candidate)).with_temperature(0.3);
        let response = self.client.generate(&request).await?.into_text();

        match parse_json::<Enrichment>(&response) {
            Ok(enrichment) => {
                debug!("Candidate enriched");
                Ok(candidate.enrich(enrichment.summary, enrichment.key_point))
            }
            Err(e) => {
                warn!(error = %e, "Unusable enrichment, keeping original summary");
                Ok(candidate)
            }
        }
    }

    /// True when the summary or signal is present but not Japanese.
    pub fn needs_localization(candidate: &Candidate) -> bool {
        [candidate.summary(), candidate.signal()]
            .into_iter()
            .flatten()
            .any(|text| !text.trim().is_empty() && !contains_japanese(text))
    }

    /// Translate `summary` and `signal` into Japanese.
    ///
    /// An unparseable answer keeps the candidate as it is.
    ///
    /// # Errors
    ///
    /// Returns the upstream error when the call itself fails.
    #[instrument(skip(self, candidate), fields(key = %candidate.key()))]
    pub async fn localize(&self, candidate: Candidate) -> KizashiResult<Candidate> {
        let request =
            GenerationRequest::prompt_only(localization_prompt(&candidate)).with_temperature(0.3);
        let response = self.client.generate(&request).await?.into_text();

        match parse_json::<Localization>(&response) {
            Ok(localized) => {
                debug!("Candidate localized");
                Ok(candidate.localize(localized.summary, localized.signal))
            }
            Err(e) => {
                warn!(error = %e, "Unusable translation, keeping original text");
                Ok(candidate)
            }
        }
    }
}

fn localization_prompt(candidate: &Candidate) -> String {
    let summary = candidate.summary().as_deref().unwrap_or_default();
    let signal = candidate.signal().as_deref().unwrap_or_default();

    format!(
        "以下の記事要約と未来の兆しを自然な日本語に翻訳してください。すでに日本語の項目はそのまま返してください。\n\n\
         タイトル: {}\n\
         記事要約: {}\n\
         未来の兆し: {}\n\n\
         以下のJSON形式で回答してください（余計な説明は不要、JSONのみ）:\n\
         {{\"summary\": \"記事要約の日本語訳\", \"signal\": \"未来の兆しの日本語訳\"}}",
        candidate.title(),
        summary,
        signal
    )
}

fn enrichment_prompt(candidate: &Candidate) -> String {
    let body = candidate
        .content()
        .as_deref()
        .or(candidate.summary().as_deref())
        .map(|text| truncate_with_ellipsis(text, BODY_LENGTH, ""))
        .unwrap_or_default();

    format!(
        "以下の記事を日本語で要約してください。\n\n\
         タイトル: {}\n\
         本文: {}\n\n\
         以下のJSON形式で回答してください（余計な説明は不要、JSONのみ）:\n\
         {{\"summary\": \"記事の要旨（100文字以内）\", \"key_point\": \"最も重要なポイント（100文字以内）\"}}",
        candidate.title(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kizashi_core::CandidateBuilder;

    #[test]
    fn test_contains_japanese_scripts() {
        assert!(contains_japanese("ひらがな"));
        assert!(contains_japanese("カタカナ"));
        assert!(contains_japanese("漢字"));
        assert!(contains_japanese("Mostly English, 少し"));
        assert!(!contains_japanese("Plain ASCII text 123"));
        assert!(!contains_japanese(""));
    }

    #[test]
    fn test_needs_localization_checks_summary_and_signal() {
        let mut base = CandidateBuilder::default();
        base.url("https://example.com/a").title("Agents");

        let japanese = base.clone().summary("要約").signal("兆し").build().unwrap();
        assert!(!Enricher::needs_localization(&japanese));

        let english_signal = base.clone().summary("要約").signal("A signal").build().unwrap();
        assert!(Enricher::needs_localization(&english_signal));

        let bare = base.clone().build().unwrap();
        assert!(!Enricher::needs_localization(&bare));
    }
}
