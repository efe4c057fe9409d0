//! Test utilities for kizashi_bot tests.
//!
//! Scripted collaborators for driving a pipeline without network access.

use async_trait::async_trait;
use kizashi_bot::{Pipeline, PipelineSettings, SourceRotation};
use kizashi_core::{Candidate, CandidateBuilder, GenerationRequest, PostReceipt, SourceDescriptor};
use kizashi_error::{FailureClass, PublishError, PublishErrorKind, UpstreamError};
use kizashi_interface::{ContentSource, DedupStore, GenerativeBackend, Publisher};
use kizashi_models::{GenerationClient, RetryPolicy};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted backend outcome.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Step {
    /// Return this text.
    Reply(String),
    /// Fail with this class.
    Fail(FailureClass),
}

/// Backend that repeats one outcome and counts calls.
pub struct ScriptedBackend {
    step: Step,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(Step::Reply(text.into()))
    }

    pub fn failing(class: FailureClass) -> Self {
        Self::new(Step::Fail(class))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, _req: &GenerationRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.step {
            Step::Reply(text) => Ok(text.clone()),
            Step::Fail(class) => Err(UpstreamError::new(*class, format!("scripted {}", class))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Source returning the same candidates every fetch, optionally after a delay.
pub struct FixedSource {
    candidates: Vec<Candidate>,
    delay: Duration,
    fetches: AtomicUsize,
}

#[allow(dead_code)]
impl FixedSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn slow(candidates: Vec<Candidate>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(candidates)
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FixedSource {
    async fn fetch(&self, _source: &SourceDescriptor, limit: usize) -> Vec<Candidate> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.candidates.iter().take(limit).cloned().collect()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Publisher that records texts and rejects any text containing a marker.
pub struct RecordingPublisher {
    reject_containing: Option<String>,
    max_length: usize,
    published: Mutex<Vec<String>>,
    attempts: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            reject_containing: None,
            max_length: 280,
            published: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(marker: impl Into<String>) -> Self {
        Self {
            reject_containing: Some(marker.into()),
            ..Self::new()
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, text: &str) -> Result<PostReceipt, PublishError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .reject_containing
            .as_deref()
            .is_some_and(|marker| text.contains(marker))
        {
            return Err(PublishError::new(PublishErrorKind::Rejected(
                "scripted rejection".to_string(),
            )));
        }
        self.published.lock().push(text.to_string());
        Ok(PostReceipt::new(format!("post-{}", attempt), "recording"))
    }

    fn platform(&self) -> &str {
        "recording"
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}

/// Candidate `n` with a distinct url and a summary long enough to be kept.
#[allow(dead_code)]
pub fn candidate(n: usize) -> Candidate {
    CandidateBuilder::default()
        .url(format!("https://example.com/{}", n))
        .title(format!("Title {}", n))
        .summary(format!("{}番目の記事の要約です。十分な長さがあります。", n))
        .build()
        .expect("valid candidate")
}

#[allow(dead_code)]
pub fn client(backend: Arc<ScriptedBackend>) -> Arc<GenerationClient> {
    Arc::new(GenerationClient::new(
        backend,
        RetryPolicy::new(Duration::from_millis(10), 1),
    ))
}

#[allow(dead_code)]
pub fn rotation() -> SourceRotation {
    SourceRotation::new(vec![SourceDescriptor::new("only", ["AI"])], 3)
}

#[allow(dead_code)]
pub fn pipeline(
    backend: Arc<ScriptedBackend>,
    source: Arc<dyn ContentSource>,
    publisher: Arc<dyn Publisher>,
    store: Arc<dyn DedupStore>,
    settings: PipelineSettings,
) -> Pipeline {
    Pipeline::new(rotation(), source, client(backend), publisher, store, settings)
}
