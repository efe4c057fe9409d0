//! Top-K selection delegated to the generation client.

use derive_getters::Getters;
use kizashi_core::{Candidate, GenerationRequest, truncate_with_ellipsis};
use kizashi_error::{KizashiResult, ParseError, ParseErrorKind};
use kizashi_models::GenerationClient;
use kizashi_parse::parse_json;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Codepoints of body text shown per candidate in the ranking prompt.
const EXCERPT_LENGTH: usize = 300;

/// A chosen candidate and why it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Selection {
    /// The candidate.
    candidate: Candidate,
    /// 1-based position in the Top-K.
    rank: usize,
    /// Rationale from the ranking model, if any.
    reason: Option<String>,
}

impl Selection {
    /// Create a selection.
    pub fn new(candidate: Candidate, rank: usize, reason: Option<String>) -> Self {
        Self {
            candidate,
            rank,
            reason,
        }
    }

    /// Consume the selection, keeping the candidate.
    pub fn into_candidate(self) -> Candidate {
        self.candidate
    }
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    #[serde(alias = "top5", alias = "ranking")]
    top: Vec<RankedEntry>,
}

#[derive(Debug, Deserialize)]
struct RankedEntry {
    #[serde(default)]
    rank: Option<usize>,
    #[serde(alias = "article_number")]
    index: usize,
    #[serde(default)]
    reason: Option<String>,
}

/// Chooses the Top-K candidates for a cycle.
///
/// Candidates published inside the cooldown window are removed before the
/// model sees them. If the model's answer cannot be parsed, or names a
/// candidate that does not exist, or the call fails without being fatal,
/// the first K remaining candidates are used in arrival order.
#[derive(Debug, Clone)]
pub struct Selector {
    client: Arc<GenerationClient>,
}

impl Selector {
    /// Selector ranking through `client`.
    pub fn new(client: Arc<GenerationClient>) -> Self {
        Self { client }
    }

    /// Choose up to `k` candidates not present in `recent`.
    ///
    /// # Errors
    ///
    /// Only a fatal upstream error is returned; everything else degrades to
    /// arrival order.
    #[instrument(skip(self, candidates, recent), fields(candidates = candidates.len(), k))]
    pub async fn select(
        &self,
        candidates: Vec<Candidate>,
        recent: &HashSet<String>,
        k: usize,
    ) -> KizashiResult<Vec<Selection>> {
        let eligible = eligible(candidates, recent);
        if eligible.is_empty() || k == 0 {
            debug!("Nothing eligible to select");
            return Ok(Vec::new());
        }
        if eligible.len() <= k {
            debug!(eligible = eligible.len(), "No more candidates than slots, skipping ranking");
            return Ok(arrival_order(eligible, k));
        }

        let request =
            GenerationRequest::prompt_only(ranking_prompt(&eligible, k)).with_temperature(0.2);

        let response = match self.client.generate(&request).await {
            Ok(result) => result.into_text(),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Ranking call failed, using arrival order");
                return Ok(arrival_order(eligible, k));
            }
        };

        match rank(&eligible, &response, k) {
            Ok(selections) => {
                info!(selected = selections.len(), "Ranked candidates");
                Ok(selections)
            }
            Err(e) => {
                warn!(error = %e, "Unusable ranking, using arrival order");
                Ok(arrival_order(eligible, k))
            }
        }
    }
}

/// Drop recently published candidates and repeated urls, keeping order.
fn eligible(candidates: Vec<Candidate>, recent: &HashSet<String>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let total = candidates.len();
    let eligible: Vec<_> = candidates
        .into_iter()
        .filter(|c| !recent.contains(c.key()) && seen.insert(c.key().to_string()))
        .collect();
    if eligible.len() < total {
        debug!(
            removed = total - eligible.len(),
            "Filtered recently published or repeated candidates"
        );
    }
    eligible
}

fn arrival_order(candidates: Vec<Candidate>, k: usize) -> Vec<Selection> {
    candidates
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, candidate)| Selection::new(candidate, i + 1, None))
        .collect()
}

fn ranking_prompt(candidates: &[Candidate], k: usize) -> String {
    let listing: String = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let excerpt = c
                .content()
                .as_deref()
                .or(c.summary().as_deref())
                .map(|text| truncate_with_ellipsis(text, EXCERPT_LENGTH, "…"))
                .unwrap_or_default();
            format!(
                "{}. タイトル: {}\n   URL: {}\n   概要: {}\n\n",
                i + 1,
                c.title(),
                c.url(),
                excerpt
            )
        })
        .collect();

    format!(
        "以下の{n}件の記事の中から、技術トレンド・イノベーション・未来への影響度を基準に重要度TOP{k}を選んでください。\n\n\
         {listing}\
         以下のJSON形式で回答してください（余計な説明は不要、JSONのみ）:\n\
         {{\"top\": [{{\"rank\": 1, \"index\": 記事番号（1-{n}）, \"reason\": \"選定理由（50文字以内）\"}}]}}",
        n = candidates.len(),
        k = k,
        listing = listing,
    )
}

/// Map a ranking response onto candidates.
///
/// Any index outside `1..=len` rejects the whole answer. Repeated indices
/// keep their first, best-ranked occurrence.
fn rank(candidates: &[Candidate], response: &str, k: usize) -> Result<Vec<Selection>, ParseError> {
    let mut ranking: RankingResponse = parse_json(response)?;
    ranking
        .top
        .sort_by_key(|entry| entry.rank.unwrap_or(usize::MAX));

    let mut used = HashSet::new();
    let mut selections = Vec::new();
    for entry in ranking.top {
        if entry.index == 0 || entry.index > candidates.len() {
            return Err(ParseError::new(ParseErrorKind::OutOfRange {
                index: entry.index,
                len: candidates.len(),
            }));
        }
        if !used.insert(entry.index) {
            continue;
        }
        let reason = entry.reason.filter(|r| !r.trim().is_empty());
        selections.push(Selection::new(
            candidates[entry.index - 1].clone(),
            selections.len() + 1,
            reason,
        ));
        if selections.len() == k {
            break;
        }
    }

    if selections.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Malformed(
            "ranking named no candidates".to_string(),
        )));
    }
    Ok(selections)
}
