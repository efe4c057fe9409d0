//! Post shape and rotation tests.

use chrono::NaiveDate;
use kizashi_bot::{PostShape, SourceRotation, rotation_index};
use kizashi_core::{CandidateBuilder, SourceDescriptor, TextBudget};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

#[test]
fn test_signal_shape_keeps_all_segments_when_room() {
    let candidate = CandidateBuilder::default()
        .url("https://example.com/a")
        .title("Agents at work")
        .summary("Companies deploy agents in production settings.")
        .signal("Agents become default coworkers.")
        .build()
        .unwrap();

    let text = PostShape::Signal
        .compose(&candidate, 1, date())
        .render(&TextBudget::new(280));

    assert_eq!(
        text,
        "Agents at work\n\n\
         Companies deploy agents in production settings.\n\n\
         🔮 未来の兆し: Agents become default coworkers."
    );
}

#[test]
fn test_signal_shape_truncates_summary_to_fit() {
    let candidate = CandidateBuilder::default()
        .url("https://example.com/a")
        .title("Title")
        .summary("lorem ".repeat(50))
        .build()
        .unwrap();

    let text = PostShape::Signal
        .compose(&candidate, 1, date())
        .render(&TextBudget::new(50));

    assert!(text.chars().count() <= 50);
    assert!(text.starts_with("Title\n\nlorem"));
    assert!(text.ends_with('…'));
}

#[test]
fn test_ranked_shape_shortens_title_before_link() {
    let candidate = CandidateBuilder::default()
        .url("https://example.com/a")
        .title("長いタイトル".repeat(20))
        .summary("Summary that will not fit anyway")
        .build()
        .unwrap();

    let text = PostShape::Ranked
        .compose(&candidate, 3, date())
        .render(&TextBudget::new(80));

    assert!(text.chars().count() <= 80);
    assert!(text.starts_with("📰 TOP3 (03/14)"));
    assert!(text.ends_with("🔗 https://example.com/a"));
    assert!(!text.contains("📝"));
}

#[test]
fn test_blank_optional_fields_are_omitted() {
    let candidate = CandidateBuilder::default()
        .url("https://example.com/a")
        .title("Title")
        .summary("   ")
        .signal("")
        .build()
        .unwrap();

    let post = PostShape::Signal.compose(&candidate, 1, date());
    assert_eq!(post.segments().len(), 1);
}

#[test]
fn test_shape_names_parse() {
    assert_eq!("ranked".parse::<PostShape>().unwrap(), PostShape::Ranked);
    assert_eq!(PostShape::Signal.to_string(), "signal");
}

#[test]
fn test_rotation_buckets_wrap_around_sources() {
    let picks: Vec<_> = (0..24).map(|h| rotation_index(h, 3, 3).unwrap()).collect();
    assert_eq!(&picks[..9], &[0, 0, 0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(picks[9], 0);
    assert_eq!(picks[23], 1);
}

#[test]
fn test_rotation_picks_descriptor_by_hour() {
    let rotation = SourceRotation::new(
        vec![
            SourceDescriptor::new("tech", ["AI"]),
            SourceDescriptor::new("society", ["Work"]),
        ],
        4,
    );
    assert_eq!(rotation.pick(3).unwrap().name(), "tech");
    assert_eq!(rotation.pick(4).unwrap().name(), "society");
    assert_eq!(rotation.pick(8).unwrap().name(), "tech");
    assert!(rotation.current().is_some());
    assert!(SourceRotation::new(Vec::new(), 3).pick(0).is_none());
}
