use kizashi_error::ValidationErrorKind;
use kizashi_parse::CandidateParser;

const RESEARCH: &str = "\
DeepResearch results follow.

【テーマ1：生成AI】
記事タイトル: Agents reach the enterprise
引用元: WIRED
掲載年月日: 2025年03月14日
記事リンク: **https://example.com/agents**
クリッピング理由: Shows adoption beyond pilots
記事要約 (150字以内): Companies deploy agents
   in production workloads.
未来の兆し (150字以内): Agents become default coworkers.
---
記事タイトル: Chips get cheaper
記事リンク: ftp://example.com/chips
---
記事タイトル: Missing link entirely
引用元: Nikkei

【テーマ2：AIエージェント】
記事タイトル: Browsers grow hands
掲載年月日: sometime soon
記事リンク: https://example.org/browsers。
---
";

#[test]
fn test_well_formed_block_populates_every_field() {
    let candidates = CandidateParser::new().parse(RESEARCH);
    let agents = &candidates[0];

    assert_eq!(agents.title(), "Agents reach the enterprise");
    assert_eq!(agents.url(), "https://example.com/agents");
    assert_eq!(agents.source().as_deref(), Some("WIRED"));
    assert_eq!(agents.theme().as_deref(), Some("生成AI"));
    assert_eq!(
        agents.summary().as_deref(),
        Some("Companies deploy agents in production workloads.")
    );
    assert_eq!(agents.reason().as_deref(), Some("Shows adoption beyond pilots"));
    assert_eq!(
        agents.signal().as_deref(),
        Some("Agents become default coworkers.")
    );
    assert_eq!(
        agents
            .published_at()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .as_deref(),
        Some("2025-03-14")
    );
    let content = agents.content().as_deref().unwrap_or_default();
    assert!(content.starts_with("Companies deploy agents"));
    assert!(content.ends_with("Agents become default coworkers."));
}

#[test]
fn test_invalid_and_missing_urls_are_dropped_with_diagnostics() {
    let report = CandidateParser::new().parse_report(RESEARCH);

    let urls: Vec<_> = report.candidates.iter().map(|c| c.url().as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://example.com/agents", "https://example.org/browsers"]
    );

    assert_eq!(report.rejected.len(), 2);
    assert!(matches!(
        &report.rejected[0].kind,
        ValidationErrorKind::InvalidUrl { url, .. } if url == "ftp://example.com/chips"
    ));
    assert!(matches!(
        &report.rejected[1].kind,
        ValidationErrorKind::MissingField(field) if field == "url"
    ));
}

#[test]
fn test_unparseable_date_keeps_record() {
    let candidates = CandidateParser::new().parse(RESEARCH);
    let browsers = &candidates[1];
    assert_eq!(browsers.theme().as_deref(), Some("AIエージェント"));
    assert!(browsers.published_at().is_none());
}

#[test]
fn test_record_missing_title_is_dropped() {
    let text = "【テーマ1：AI】\n記事リンク: https://example.com/untitled\n";
    let report = CandidateParser::new().parse_report(text);
    assert!(report.candidates.is_empty());
    assert!(matches!(
        &report.rejected[0].kind,
        ValidationErrorKind::MissingField(field) if field == "title"
    ));
}

#[test]
fn test_english_labels_and_irregular_spacing() {
    let text = "[Theme 1: Robotics]\n\n  **Title** :   Robots   learn\n\tto fold laundry\nURL: <https://example.com/robots>\nSummary: Folding is hard.\n";
    let candidates = CandidateParser::new().parse(text);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title(), "Robots learn to fold laundry");
    assert_eq!(candidates[0].url(), "https://example.com/robots");
    assert_eq!(candidates[0].theme().as_deref(), Some("Robotics"));
}

#[test]
fn test_text_without_markers_is_one_section() {
    let text = "Title: Standalone\nLink: https://example.com/standalone\n";
    let candidates = CandidateParser::new().parse(text);
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].theme().is_none());
}

#[test]
fn test_prose_blocks_are_ignored_silently() {
    let text = "【テーマ1：AI】\nThis week was busy.\n---\nTitle: Real\nURL: https://example.com/real\n";
    let report = CandidateParser::new().parse_report(text);
    assert_eq!(report.candidates.len(), 1);
    assert!(report.rejected.is_empty());
}

#[test]
fn test_empty_blob_yields_nothing() {
    let report = CandidateParser::new().parse_report("");
    assert!(report.candidates.is_empty());
    assert!(report.rejected.is_empty());
}

#[test]
fn test_label_words_inside_values_do_not_split_fields() {
    let text = "[Theme 1: Data]\n\
        Title: Source: how AI labs pick training data\n\
        URL: https://example.com/data\n\
        ---\n\
        Title: Launch window\n\
        URL: https://example.com/launch\n\
        Summary: The launch date: set for May by the lab.\n";
    let report = CandidateParser::new().parse_report(text);

    assert!(report.rejected.is_empty());
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(
        report.candidates[0].title(),
        "Source: how AI labs pick training data"
    );
    assert!(report.candidates[0].source().is_none());
    assert_eq!(
        report.candidates[1].summary().as_deref(),
        Some("The launch date: set for May by the lab.")
    );
}

#[test]
fn test_bulleted_labels_are_recognized() {
    let text = "- **記事タイトル**: 箇条書きの記事\n- 記事リンク: https://example.com/bullets\n";
    let candidates = CandidateParser::new().parse(text);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title(), "箇条書きの記事");
}

#[test]
fn test_parsed_urls_use_the_canonical_key() {
    let text = "Title: Bare host\nURL: https://Example.com\n";
    let candidates = CandidateParser::new().parse(text);
    assert_eq!(candidates[0].url(), "https://example.com/");
}
