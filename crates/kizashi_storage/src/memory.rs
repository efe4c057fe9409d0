//! Process-local dedup ledger.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use kizashi_core::PublishRecord;
use kizashi_error::KizashiResult;
use kizashi_interface::DedupStore;
use parking_lot::RwLock;
use tracing::debug;

/// Dedup ledger held in memory. Lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    records: RwLock<Vec<PublishRecord>>,
}

impl InMemoryDedupStore {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with existing records.
    pub fn with_records(records: impl IntoIterator<Item = PublishRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Number of records ever appended.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn is_recently_published(&self, key: &str, window: Duration) -> KizashiResult<bool> {
        let now = Utc::now();
        Ok(self
            .records
            .read()
            .iter()
            .any(|record| record.key() == key && record.is_within(window, now)))
    }

    async fn record_published(&self, record: PublishRecord) -> KizashiResult<()> {
        debug!(key = %record.key(), platform = %record.platform(), "Recording publish");
        self.records.write().push(record);
        Ok(())
    }

    async fn recent(&self, window: Duration) -> KizashiResult<Vec<PublishRecord>> {
        let now = Utc::now();
        let mut recent: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|record| record.is_within(window, now))
            .cloned()
            .collect();
        recent.sort_by_key(|record| *record.published_at());
        Ok(recent)
    }
}
