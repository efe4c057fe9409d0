//! Publisher that only logs.

use crate::ensure_fits;
use async_trait::async_trait;
use kizashi_core::PostReceipt;
use kizashi_error::PublishError;
use kizashi_interface::Publisher;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

/// Publisher for demos and dry runs.
///
/// Nothing leaves the process. Each post gets an id of the form
/// `demo_<16 hex digits>` derived from the text and its position in the
/// session, and the texts are kept for inspection.
///
/// # Examples
///
/// ```
/// use kizashi_interface::Publisher;
/// use kizashi_social::DemoPublisher;
///
/// # #[tokio::main]
/// # async fn main() {
/// let publisher = DemoPublisher::new();
/// let receipt = publisher.publish("未来の兆し").await.unwrap();
/// assert!(receipt.post_id().0.starts_with("demo_"));
/// assert_eq!(publisher.published(), vec!["未来の兆し".to_string()]);
/// # }
/// ```
#[derive(Debug)]
pub struct DemoPublisher {
    max_length: usize,
    published: Mutex<Vec<String>>,
}

impl Default for DemoPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoPublisher {
    /// Demo publisher with the 280 codepoint reference limit.
    pub fn new() -> Self {
        Self::with_max_length(280)
    }

    /// Demo publisher with a custom limit.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Texts published so far, oldest first.
    pub fn published(&self) -> Vec<String> {
        self.published.lock().clone()
    }

    fn post_id(sequence: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(sequence.to_le_bytes());
        hasher.update(text.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("demo_{}", &digest[..16])
    }
}

#[async_trait]
impl Publisher for DemoPublisher {
    #[instrument(skip(self, text), fields(length = text.chars().count()))]
    async fn publish(&self, text: &str) -> Result<PostReceipt, PublishError> {
        ensure_fits(text, self.max_length)?;

        let mut published = self.published.lock();
        let post_id = Self::post_id(published.len(), text);
        published.push(text.to_string());

        info!(post_id = %post_id, "Demo post\n{}", text);
        Ok(PostReceipt::new(post_id, "demo"))
    }

    fn platform(&self) -> &str {
        "demo"
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}
