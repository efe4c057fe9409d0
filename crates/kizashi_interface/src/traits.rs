//! Collaborator traits.

use async_trait::async_trait;
use chrono::Duration;
use kizashi_core::{Candidate, GenerationRequest, PostReceipt, PublishRecord, SourceDescriptor};
use kizashi_error::{KizashiResult, PublishError, UpstreamError};
use std::collections::HashSet;

/// A single generative backend.
///
/// Implementations make exactly one call per invocation and classify any
/// failure; retry, backoff and fallback belong to the generation client
/// wrapping them.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate text for a request.
    async fn generate(&self, req: &GenerationRequest) -> Result<String, UpstreamError>;

    /// Provider name (e.g., "openai", "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier used when the request does not override it.
    fn model_name(&self) -> &str;
}

/// Produces candidates for a source descriptor.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch up to `limit` candidates.
    ///
    /// Sources log their own failures and return an empty list rather than
    /// an error, so a broken source never aborts a cycle.
    async fn fetch(&self, source: &SourceDescriptor, limit: usize) -> Vec<Candidate>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Posts finished text to a platform.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The text exceeds [`Publisher::max_length`]
    /// - Authentication fails
    /// - The platform rejects the post
    async fn publish(&self, text: &str) -> Result<PostReceipt, PublishError>;

    /// Platform name (e.g., "bluesky", "demo").
    fn platform(&self) -> &str;

    /// Maximum post length in codepoints.
    fn max_length(&self) -> usize {
        280
    }
}

/// Ledger of confirmed publishes used for deduplication.
///
/// Writes are serialized by each implementation; reads may run
/// concurrently with each other and with a write.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Whether `key` was published within the rolling `window`.
    async fn is_recently_published(&self, key: &str, window: Duration) -> KizashiResult<bool>;

    /// Append a confirmed publish.
    async fn record_published(&self, record: PublishRecord) -> KizashiResult<()>;

    /// Records inside the rolling `window`, oldest first.
    async fn recent(&self, window: Duration) -> KizashiResult<Vec<PublishRecord>>;

    /// Keys published inside the rolling `window`.
    async fn recent_keys(&self, window: Duration) -> KizashiResult<HashSet<String>> {
        Ok(self
            .recent(window)
            .await?
            .into_iter()
            .map(|record| record.key().clone())
            .collect())
    }
}
