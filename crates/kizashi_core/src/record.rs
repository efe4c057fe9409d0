//! Publication results and the dedup ledger entry.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Platform-specific post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct PostId(pub String);

/// What a publisher returns for a confirmed post.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PostReceipt {
    /// Identifier assigned by the platform.
    post_id: PostId,
    /// Platform name (e.g. "bluesky", "demo").
    platform: String,
}

impl PostReceipt {
    /// Create a receipt.
    pub fn new(post_id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            post_id: PostId(post_id.into()),
            platform: platform.into(),
        }
    }
}

/// Dedup ledger entry, written once per confirmed publish.
///
/// Records are append-only: nothing updates or deletes them.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use kizashi_core::{PostReceipt, PublishRecord};
///
/// let receipt = PostReceipt::new("at://did:plc:abc/app.bsky.feed.post/1", "bluesky");
/// let record = PublishRecord::from_receipt("https://example.com/a", &receipt);
///
/// assert!(record.is_within(Duration::hours(3), Utc::now()));
/// assert_eq!(record.platform(), "bluesky");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PublishRecord {
    /// Candidate key (url).
    key: String,
    /// When the publish was confirmed.
    published_at: DateTime<Utc>,
    /// Platform name.
    platform: String,
    /// Identifier assigned by the platform.
    post_id: String,
}

impl PublishRecord {
    /// Create a record with an explicit timestamp.
    pub fn new(
        key: impl Into<String>,
        published_at: DateTime<Utc>,
        platform: impl Into<String>,
        post_id: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            published_at,
            platform: platform.into(),
            post_id: post_id.into(),
        }
    }

    /// Record a confirmed publish happening now.
    pub fn from_receipt(key: impl Into<String>, receipt: &PostReceipt) -> Self {
        Self::new(
            key,
            Utc::now(),
            receipt.platform().clone(),
            receipt.post_id().0.clone(),
        )
    }

    /// Whether this record falls inside the rolling window ending at `now`.
    pub fn is_within(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.published_at > now - window
    }
}
