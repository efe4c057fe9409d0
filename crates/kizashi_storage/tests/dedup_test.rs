//! Dedup ledger behavior across backends.

use chrono::{Duration, Utc};
use kizashi_core::PublishRecord;
use kizashi_error::{KizashiErrorKind, StorageErrorKind};
use kizashi_interface::DedupStore;
use kizashi_storage::{InMemoryDedupStore, JsonDedupStore};
use std::sync::Arc;

fn record(key: &str, hours_ago: i64) -> PublishRecord {
    PublishRecord::new(
        key,
        Utc::now() - Duration::hours(hours_ago),
        "demo",
        format!("demo_{}", key.len()),
    )
}

async fn assert_window_semantics(store: &dyn DedupStore) {
    store.record_published(record("https://example.com/old", 4)).await.unwrap();
    store.record_published(record("https://example.com/new", 1)).await.unwrap();

    let window = Duration::hours(3);
    assert!(store.is_recently_published("https://example.com/new", window).await.unwrap());
    assert!(!store.is_recently_published("https://example.com/old", window).await.unwrap());
    assert!(!store.is_recently_published("https://example.com/never", window).await.unwrap());

    // The old record becomes active again under a wider window.
    assert!(store
        .is_recently_published("https://example.com/old", Duration::hours(5))
        .await
        .unwrap());

    let keys = store.recent_keys(window).await.unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys.contains("https://example.com/new"));
}

#[tokio::test]
async fn test_memory_store_window() {
    let store = InMemoryDedupStore::new();
    assert_window_semantics(&store).await;
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_json_store_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDedupStore::open(dir.path().join("ledger.json")).await.unwrap();
    assert_window_semantics(&store).await;
}

#[tokio::test]
async fn test_recent_is_oldest_first() {
    let store = InMemoryDedupStore::with_records(vec![
        record("https://example.com/b", 1),
        record("https://example.com/a", 2),
        record("https://example.com/stale", 30),
    ]);

    let recent = store.recent(Duration::hours(24)).await.unwrap();
    let keys: Vec<_> = recent.iter().map(|r| r.key().as_str()).collect();
    assert_eq!(keys, vec!["https://example.com/a", "https://example.com/b"]);
}

#[tokio::test]
async fn test_json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("ledger.json");

    {
        let store = JsonDedupStore::open(&path).await.unwrap();
        store.record_published(record("https://example.com/a", 0)).await.unwrap();
        store.record_published(record("https://example.com/a", 0)).await.unwrap();
    }

    let reopened = JsonDedupStore::open(&path).await.unwrap();
    let recent = reopened.recent(Duration::hours(1)).await.unwrap();
    assert_eq!(recent.len(), 2, "appends never replace earlier records");
    assert!(reopened
        .is_recently_published("https://example.com/a", Duration::hours(1))
        .await
        .unwrap());
    assert!(!path.with_file_name("ledger.json.tmp").exists());
}

#[tokio::test]
async fn test_json_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDedupStore::open(dir.path().join("absent.json")).await.unwrap();
    assert!(store.recent(Duration::days(365)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_json_store_rejects_corrupt_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonDedupStore::open(&path).await.unwrap_err();
    match err.kind() {
        KizashiErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::Serialization(_)))
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_json_store_serializes_concurrent_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let store = Arc::new(JsonDedupStore::open(&path).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .record_published(record(&format!("https://example.com/{}", i), 0))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reopened = JsonDedupStore::open(&path).await.unwrap();
    assert_eq!(reopened.recent(Duration::hours(1)).await.unwrap().len(), 16);
}
