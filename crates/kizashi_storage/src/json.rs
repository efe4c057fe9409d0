//! JSON file dedup ledger.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use kizashi_core::PublishRecord;
use kizashi_error::{KizashiResult, StorageError, StorageErrorKind};
use kizashi_interface::DedupStore;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Dedup ledger persisted as a JSON array of [`PublishRecord`]s.
///
/// Appends are serialized through a single writer lock. Each append writes
/// the whole ledger to a sibling temp file and renames it over the original,
/// so a crash mid-write leaves the previous ledger intact. Reads are served
/// from an in-memory copy and never wait on the file.
#[derive(Debug)]
pub struct JsonDedupStore {
    path: PathBuf,
    cache: RwLock<Vec<PublishRecord>>,
    writer: Mutex<()>,
}

impl JsonDedupStore {
    /// Open the ledger at `path`, creating an empty one if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or decoded.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> KizashiResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = load(&path).await?;
        info!(records = records.len(), "Ledger loaded");
        Ok(Self {
            path,
            cache: RwLock::new(records),
            writer: Mutex::new(()),
        })
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn load(path: &Path) -> Result<Vec<PublishRecord>, StorageError> {
    debug!(path = ?path, "Loading ledger");
    if !tokio::fs::try_exists(path).await? {
        return Ok(Vec::new());
    }
    let json = tokio::fs::read_to_string(path).await?;
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&json).map_err(|e| {
        StorageError::new(StorageErrorKind::Serialization(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

#[async_trait]
impl DedupStore for JsonDedupStore {
    async fn is_recently_published(&self, key: &str, window: Duration) -> KizashiResult<bool> {
        let now = Utc::now();
        Ok(self
            .cache
            .read()
            .iter()
            .any(|record| record.key() == key && record.is_within(window, now)))
    }

    #[instrument(skip(self, record), fields(key = %record.key()))]
    async fn record_published(&self, record: PublishRecord) -> KizashiResult<()> {
        let _writer = self.writer.lock().await;

        let mut records = self.cache.read().clone();
        records.push(record);

        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::from)?;
        }
        let temp = self.temp_path();
        debug!(path = ?self.path, temp = ?temp, "Saving ledger");
        tokio::fs::write(&temp, json)
            .await
            .map_err(StorageError::from)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(StorageError::from)?;

        *self.cache.write() = records;
        info!("Ledger saved");
        Ok(())
    }

    async fn recent(&self, window: Duration) -> KizashiResult<Vec<PublishRecord>> {
        let now = Utc::now();
        let mut recent: Vec<_> = self
            .cache
            .read()
            .iter()
            .filter(|record| record.is_within(window, now))
            .cloned()
            .collect();
        recent.sort_by_key(|record| *record.published_at());
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_sits_next_to_ledger() {
        let store = JsonDedupStore {
            path: PathBuf::from("/var/lib/kizashi/ledger.json"),
            cache: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        };
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/kizashi/ledger.json.tmp")
        );
    }
}
