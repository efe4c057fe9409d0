//! Content sources.

use async_trait::async_trait;
use kizashi_core::{Candidate, GenerationRequest, SourceDescriptor};
use kizashi_interface::ContentSource;
use kizashi_models::GenerationClient;
use kizashi_parse::{CandidateParser, validate_candidate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const RESEARCH_SYSTEM: &str = "あなたは「デザイン思考」を専門とする未来学者です。\
    Web検索の結果に実在するニュース記事だけを引用し、架空の記事・タイトル・URLを創作してはいけません。";

/// Asks the generation client to research the descriptor's themes and
/// parses the labeled answer into candidates.
#[derive(Debug, Clone)]
pub struct ResearchSource {
    client: Arc<GenerationClient>,
    parser: CandidateParser,
}

impl ResearchSource {
    /// Research source using `client`.
    pub fn new(client: Arc<GenerationClient>) -> Self {
        Self {
            client,
            parser: CandidateParser::new(),
        }
    }
}

/// Prompt asking for two articles per theme in the labeled record format.
pub fn research_prompt(source: &SourceDescriptor, limit: usize) -> String {
    let themes = source.themes();
    let per_theme = 2.min(limit.max(1));
    let sections: String = themes
        .iter()
        .enumerate()
        .map(|(i, theme)| format!("{}. {}\n", i + 1, theme))
        .collect();

    format!(
        "以下のテーマごとに、未来の兆し（Weak Signals）を含む最近3ヶ月以内の実在するニュース記事を{per_theme}件ずつ選んでください。\
         合計は最大{limit}件です。見つからない場合は件数を減らしてください。\n\n\
         【今回のテーマ】\n{sections}\n\
         出力形式（テーマごとにセクションを分け、記事の間には --- の行を入れてください）:\n\n\
         【テーマ1：テーマ名】\n\
         記事タイトル: 元記事のタイトル\n\
         引用元: メディア名\n\
         掲載年月日: YYYY年MM月DD日\n\
         記事リンク: https://...\n\
         クリッピング理由: Weak Signalとして重要な理由\n\
         記事要約 (150字以内): 記事の要点\n\
         未来の兆し (150字以内): このニュースから読み取れる未来の兆し\n\
         ---\n",
        per_theme = per_theme,
        limit = limit,
        sections = sections,
    )
}

#[async_trait]
impl ContentSource for ResearchSource {
    #[instrument(skip(self, source), fields(source = %source.name()))]
    async fn fetch(&self, source: &SourceDescriptor, limit: usize) -> Vec<Candidate> {
        let request =
            GenerationRequest::prompt_only(research_prompt(source, limit)).with_system(RESEARCH_SYSTEM);

        let text = match self.client.generate(&request).await {
            Ok(result) => result.into_text(),
            Err(e) => {
                warn!(error = %e, "Research call failed");
                return Vec::new();
            }
        };

        let report = self.parser.parse_report(&text);
        info!(
            accepted = report.candidates.len(),
            rejected = report.rejected.len(),
            "Research parsed"
        );
        report.candidates.into_iter().take(limit).collect()
    }

    fn name(&self) -> &str {
        "research"
    }
}

/// Reads candidates from a JSON array on disk.
///
/// The file is read on every fetch. Each record goes through the same URL
/// check as parsed research, and records that fail it are dropped. The
/// descriptor's themes filter the candidates when both sides carry a theme.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    #[instrument(skip(self, source), fields(path = ?self.path, source = %source.name()))]
    async fn fetch(&self, source: &SourceDescriptor, limit: usize) -> Vec<Candidate> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not read candidate file");
                return Vec::new();
            }
        };
        let candidates: Vec<Candidate> = match serde_json::from_str(&json) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Could not decode candidate file");
                return Vec::new();
            }
        };

        let themes = source.themes();
        let matching: Vec<_> = candidates
            .into_iter()
            .filter_map(|c| match validate_candidate(c) {
                Ok(valid) => Some(valid),
                Err(e) => {
                    warn!(error = %e, "Dropping invalid candidate");
                    None
                }
            })
            .filter(|c| match c.theme() {
                Some(theme) if !themes.is_empty() => themes.contains(theme),
                _ => true,
            })
            .take(limit)
            .collect();
        debug!(candidates = matching.len(), "Loaded candidates from file");
        matching
    }

    fn name(&self) -> &str {
        "file"
    }
}
