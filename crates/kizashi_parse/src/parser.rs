//! Candidate extraction from sectioned research text.
//!
//! Research output is organized as theme sections, each holding records
//! separated by `---` lines. A record is a run of labeled fields:
//!
//! ```text
//! 【テーマ1：生成AI】
//! 記事タイトル: Agents reach the enterprise
//! 引用元: WIRED
//! 掲載年月日: 2025年03月14日
//! 記事リンク: https://example.com/agents
//! クリッピング理由: Shows adoption beyond pilots
//! 記事要約 (150字以内): Companies deploy agents in production.
//! 未来の兆し (150字以内): Agents become default coworkers.
//! ---
//! ```
//!
//! English labels (`Title:`, `URL:`, ...) and `[Theme 1: name]` markers are
//! accepted as well.

use crate::{canonical_url, parse_date};
use kizashi_core::{Candidate, CandidateBuilder, truncate_with_ellipsis};
use kizashi_error::{ValidationError, ValidationErrorKind};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Ceiling on the combined body text, in codepoints.
const CONTENT_LIMIT: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Title,
    Source,
    Date,
    Url,
    Reason,
    Summary,
    Signal,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        let field = match label.to_lowercase().as_str() {
            "記事タイトル" | "title" => Field::Title,
            "引用元" | "source" => Field::Source,
            "掲載年月日" | "date" => Field::Date,
            "記事リンク" | "url" | "link" => Field::Url,
            "クリッピング理由" | "reason" => Field::Reason,
            "記事要約" | "summary" => Field::Summary,
            "未来の兆し" | "signal" => Field::Signal,
            _ => return None,
        };
        Some(field)
    }

    fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Source => "source",
            Field::Date => "date",
            Field::Url => "url",
            Field::Reason => "reason",
            Field::Summary => "summary",
            Field::Signal => "signal",
        }
    }
}

/// Candidates accepted from a blob plus the records that were dropped.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Records that passed validation, in input order.
    pub candidates: Vec<Candidate>,
    /// Why each dropped record was rejected.
    pub rejected: Vec<ValidationError>,
}

/// Extracts candidates from sectioned, labeled research text.
///
/// # Examples
///
/// ```
/// use kizashi_parse::CandidateParser;
///
/// let text = "【テーマ1：AI】\n\
///     記事タイトル: Agents at work\n\
///     記事リンク: https://example.com/agents\n\
///     ---\n\
///     記事タイトル: No link here\n";
///
/// let report = CandidateParser::new().parse_report(text);
/// assert_eq!(report.candidates.len(), 1);
/// assert_eq!(report.rejected.len(), 1);
/// assert_eq!(report.candidates[0].theme().as_deref(), Some("AI"));
/// ```
#[derive(Debug, Clone)]
pub struct CandidateParser {
    section: Regex,
    separator: Regex,
    label: Regex,
}

impl Default for CandidateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self {
            section: Regex::new(
                r"【\s*テーマ\s*\d*\s*[:：]\s*([^】]+?)\s*】|\[\s*(?i:theme)\s*\d*\s*[:：]\s*([^\]\n]+?)\s*\]",
            )
            .expect("Valid section regex"),
            separator: Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*$").expect("Valid separator regex"),
            label: Regex::new(
                r"(?im)^[ \t]*(?:[-•・*][ \t]*)*(?:\d+[.)][ \t]*)?(記事タイトル|引用元|掲載年月日|記事リンク|クリッピング理由|記事要約|未来の兆し|\btitle\b|\bsource\b|\bdate\b|\burl\b|\blink\b|\breason\b|\bsummary\b|\bsignal\b)[ \t]*(?:[（(][^）)\n]{0,20}[）)])?[ \t]*\**[ \t]*[:：]",
            )
            .expect("Valid label regex"),
        }
    }

    /// Extract candidates, logging a diagnostic for each dropped record.
    pub fn parse(&self, blob: &str) -> Vec<Candidate> {
        self.parse_report(blob).candidates
    }

    /// Extract candidates and keep the rejection reasons.
    ///
    /// Text before the first section marker is ignored. A blob with no
    /// marker at all is read as a single untitled section.
    #[instrument(skip(self, blob), fields(blob_length = blob.len()))]
    pub fn parse_report(&self, blob: &str) -> ParseReport {
        let mut report = ParseReport::default();

        for (theme, body) in self.sections(blob) {
            for block in self.separator.split(body) {
                if block.trim().is_empty() {
                    continue;
                }
                match self.parse_block(block, theme) {
                    Ok(Some(candidate)) => report.candidates.push(candidate),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "Dropping candidate record");
                        report.rejected.push(e);
                    }
                }
            }
        }

        debug!(
            accepted = report.candidates.len(),
            rejected = report.rejected.len(),
            "Parsed research text"
        );
        report
    }

    fn sections<'a>(&self, blob: &'a str) -> Vec<(Option<&'a str>, &'a str)> {
        let markers: Vec<_> = self.section.captures_iter(blob).collect();
        if markers.is_empty() {
            return vec![(None, blob)];
        }

        markers
            .iter()
            .enumerate()
            .filter_map(|(i, caps)| {
                let whole = caps.get(0)?;
                let theme = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
                let end = markers
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(blob.len(), |m| m.start());
                Some((Some(theme), &blob[whole.end()..end]))
            })
            .collect()
    }

    /// `Ok(None)` for blocks with no labeled fields at all (stray prose).
    fn parse_block(
        &self,
        block: &str,
        theme: Option<&str>,
    ) -> Result<Option<Candidate>, ValidationError> {
        let fields = self.fields(block);
        if fields.is_empty() {
            return Ok(None);
        }

        let title = fields
            .get(&Field::Title)
            .cloned()
            .ok_or_else(|| missing(Field::Title))?;
        let raw_url = fields.get(&Field::Url).ok_or_else(|| missing(Field::Url))?;
        let url = canonical_url(raw_url)?;

        let mut builder = CandidateBuilder::default();
        builder.url(url).title(title);

        if let Some(theme) = theme {
            builder.theme(theme);
        }
        if let Some(source) = fields.get(&Field::Source) {
            builder.source(source.as_str());
        }
        if let Some(raw) = fields.get(&Field::Date) {
            match parse_date(raw) {
                Some(date) => {
                    builder.published_at(date);
                }
                None => debug!(date = %raw, "Ignoring unrecognized publication date"),
            }
        }

        let summary = fields.get(&Field::Summary);
        let reason = fields.get(&Field::Reason);
        let signal = fields.get(&Field::Signal);

        let content = [summary, reason, signal]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");
        if !content.is_empty() {
            builder.content(truncate_with_ellipsis(&content, CONTENT_LIMIT, ""));
        }
        if let Some(summary) = summary {
            builder.summary(summary.as_str());
        }
        if let Some(reason) = reason {
            builder.reason(reason.as_str());
        }
        if let Some(signal) = signal {
            builder.signal(signal.as_str());
        }

        builder.build().map(Some).map_err(|e| {
            ValidationError::new(ValidationErrorKind::MissingField(e.to_string()))
        })
    }

    /// Labeled values in a block. A label only counts at the start of a
    /// line, after optional bullets or emphasis. The first occurrence of a
    /// label wins and each value runs until the next label.
    fn fields(&self, block: &str) -> HashMap<Field, String> {
        let labels: Vec<_> = self.label.captures_iter(block).collect();
        let mut fields = HashMap::new();

        for (i, caps) in labels.iter().enumerate() {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(field) = Field::from_label(name.as_str()) else {
                continue;
            };
            let end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(block.len(), |m| m.start());
            let value = normalize(&block[whole.end()..end]);
            if !value.is_empty() {
                fields.entry(field).or_insert(value);
            }
        }

        fields
    }
}

/// Collapse whitespace and strip markdown emphasis and list bullets left
/// around a value.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '*' || c == '-' || c == '•' || c.is_whitespace())
        .to_string()
}

fn missing(field: Field) -> ValidationError {
    ValidationError::new(ValidationErrorKind::MissingField(field.name().to_string()))
}
