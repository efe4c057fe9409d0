//! Publisher contract tests.

use kizashi_error::PublishErrorKind;
use kizashi_interface::Publisher;
use kizashi_social::{BlueskyPublisher, DemoPublisher, ensure_fits, link_facets};

#[tokio::test]
async fn test_demo_ids_are_distinct_per_post() {
    let publisher = DemoPublisher::new();

    let first = publisher.publish("same text").await.unwrap();
    let second = publisher.publish("same text").await.unwrap();

    assert_ne!(first.post_id(), second.post_id());
    assert_eq!(first.platform(), "demo");
    assert_eq!(first.post_id().0.len(), "demo_".len() + 16);
    assert_eq!(publisher.published().len(), 2);
}

#[tokio::test]
async fn test_demo_rejects_over_length_text() {
    let publisher = DemoPublisher::with_max_length(10);

    let err = publisher.publish("未来の兆しは静かに現れる").await.unwrap_err();

    assert_eq!(
        err.kind,
        PublishErrorKind::TooLong {
            length: 12,
            max_length: 10
        }
    );
    assert!(publisher.published().is_empty());
}

#[test]
fn test_limit_counts_codepoints_not_bytes() {
    // 10 codepoints, 30 bytes
    assert!(ensure_fits("あいうえおかきくけこ", 10).is_ok());
    assert!(ensure_fits("あいうえおかきくけこさ", 10).is_err());
}

#[test]
fn test_facets_use_utf8_byte_offsets() {
    let text = "【生成AI】\n\n🔗 https://example.com/ai?id=1\n\n💡 続報 http://news.example.org/b)";
    let facets = link_facets(text);

    assert_eq!(facets.len(), 2);
    assert_eq!(facets[0].uri, "https://example.com/ai?id=1");
    assert_eq!(facets[1].uri, "http://news.example.org/b");
    for facet in &facets {
        assert_eq!(&text[facet.byte_start..facet.byte_end], facet.uri);
    }
    // The emoji and CJK text before the first link are multi-byte.
    assert!(facets[0].byte_start > text[..facets[0].byte_start].chars().count());
}

#[test]
fn test_bluesky_limit_is_configurable() {
    let publisher = BlueskyPublisher::new("someone.bsky.social", "secret");
    assert_eq!(publisher.max_length(), 300);
    assert_eq!(publisher.platform(), "bluesky");

    let publisher = publisher.with_max_length(280);
    assert_eq!(publisher.max_length(), 280);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_bluesky_live_post() {
    dotenvy::dotenv().ok();
    let publisher = BlueskyPublisher::from_env(None).expect("Bluesky credentials must be set");

    let receipt = publisher
        .publish("kizashi integration test https://example.com")
        .await
        .unwrap();

    assert!(receipt.post_id().0.starts_with("at://"));
}
