//! One fetch, select, compose, publish cycle.

use crate::{Enricher, PipelineMetrics, PostShape, Selection, Selector, SourceRotation};
use chrono::{Local, NaiveDate};
use derive_getters::Getters;
use kizashi_core::{Candidate, PublishRecord, TextBudget};
use kizashi_error::{ConfigError, KizashiResult};
use kizashi_interface::{ContentSource, DedupStore, Publisher};
use kizashi_models::GenerationClient;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Where a cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Between cycles
    Idle,
    /// Asking the content source for candidates
    Fetching,
    /// Filtering and ranking candidates
    Selecting,
    /// Enriching and budgeting post text
    Composing,
    /// Sending posts and recording confirmed ones
    Publishing,
}

/// Tunables for a pipeline.
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct PipelineSettings {
    /// Posts per cycle.
    #[builder(default = "5")]
    top_k: usize,
    /// Candidates requested from the source.
    #[builder(default = "20")]
    fetch_limit: usize,
    /// Rolling dedup window.
    #[builder(default = "chrono::Duration::hours(3)")]
    cooldown: chrono::Duration,
    /// Post layout.
    #[builder(default)]
    shape: PostShape,
    /// Lowers the publisher's limit; larger values are clamped.
    #[builder(default, setter(into, strip_option))]
    max_length: Option<usize>,
    /// Marks truncated text.
    #[builder(default = "\"…\".to_string()")]
    ellipsis: String,
    /// Pause between consecutive publishes.
    #[builder(default)]
    pause_between_posts: Duration,
}

/// Counts emitted at the end of every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("processed={processed} selected={selected} posted={posted} skipped={skipped} failed={failed}")]
pub struct CycleSummary {
    /// Source the cycle queried.
    pub source: String,
    /// Candidates returned by the source.
    pub processed: usize,
    /// Candidates chosen for composition.
    pub selected: usize,
    /// Confirmed publishes.
    pub posted: usize,
    /// Candidates dropped by dedup, selection or enrichment.
    pub skipped: usize,
    /// Publishes the platform rejected.
    pub failed: usize,
}

/// A composed post ready to publish.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Draft {
    /// Dedup key of the source candidate.
    key: String,
    /// Rank within the cycle.
    rank: usize,
    /// Budgeted text.
    text: String,
}

/// The fetch, select, compose and publish pipeline.
///
/// Constructed once with its collaborators and driven by
/// [`run_cycle`](Pipeline::run_cycle). Cycles never overlap: a second
/// caller waits for the running cycle, while
/// [`try_run_cycle`](Pipeline::try_run_cycle) gives up instead.
pub struct Pipeline {
    rotation: SourceRotation,
    source: Arc<dyn ContentSource>,
    selector: Selector,
    enricher: Enricher,
    publisher: Arc<dyn Publisher>,
    store: Arc<dyn DedupStore>,
    settings: PipelineSettings,
    metrics: PipelineMetrics,
    stage: Mutex<Stage>,
    running: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("publisher", &self.publisher.platform())
            .field("settings", &self.settings)
            .field("stage", &self.stage())
            .finish()
    }
}

impl Pipeline {
    /// Assemble a pipeline.
    ///
    /// The generation client is shared by selection and enrichment.
    pub fn new(
        rotation: SourceRotation,
        source: Arc<dyn ContentSource>,
        client: Arc<GenerationClient>,
        publisher: Arc<dyn Publisher>,
        store: Arc<dyn DedupStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            rotation,
            source,
            selector: Selector::new(client.clone()),
            enricher: Enricher::new(client),
            publisher,
            store,
            settings,
            metrics: PipelineMetrics::new(),
            stage: Mutex::new(Stage::Idle),
            running: tokio::sync::Mutex::new(()),
        }
    }

    /// Share an existing metrics collector.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Metrics for this pipeline.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        *self.stage.lock()
    }

    /// Budget used for composition. An override never exceeds the
    /// publisher's own limit.
    pub fn budget(&self) -> TextBudget {
        let limit = self.publisher.max_length();
        let max_length = self
            .settings
            .max_length
            .map_or(limit, |max| max.min(limit));
        TextBudget::new(max_length).with_ellipsis(self.settings.ellipsis.clone())
    }

    /// Run one cycle, waiting for any cycle already in progress.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger cannot be read or written, or a fatal
    /// upstream error occurs. Posts confirmed before the failure stay
    /// recorded.
    pub async fn run_cycle(&self) -> KizashiResult<CycleSummary> {
        let _running = self.running.lock().await;
        self.cycle().await
    }

    /// Run one cycle unless one is already in progress.
    ///
    /// Returns `None` without doing anything when a cycle is running.
    pub async fn try_run_cycle(&self) -> Option<KizashiResult<CycleSummary>> {
        let _running = self.running.try_lock().ok()?;
        Some(self.cycle().await)
    }

    #[instrument(skip(self), fields(shape = %self.settings.shape, top_k = self.settings.top_k))]
    async fn cycle(&self) -> KizashiResult<CycleSummary> {
        self.metrics.record_cycle();
        let result = self.stages().await;
        self.set_stage(Stage::Idle);

        match &result {
            Ok(summary) => {
                self.metrics.record_cycle_success();
                info!(
                    source = %summary.source,
                    processed = summary.processed,
                    selected = summary.selected,
                    posted = summary.posted,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Cycle complete"
                );
            }
            Err(e) => {
                self.metrics.record_cycle_failure();
                error!(error = %e, fatal = e.is_fatal(), "Cycle aborted");
            }
        }
        result
    }

    async fn stages(&self) -> KizashiResult<CycleSummary> {
        let mut summary = CycleSummary::default();

        self.set_stage(Stage::Fetching);
        let descriptor = self
            .rotation
            .current()
            .ok_or_else(|| ConfigError::new("no sources configured"))?;
        summary.source = descriptor.name().clone();
        let candidates = self
            .source
            .fetch(descriptor, self.settings.fetch_limit)
            .await;
        summary.processed = candidates.len();
        debug!(source = %descriptor.name(), candidates = candidates.len(), "Fetched");

        self.set_stage(Stage::Selecting);
        let recent = self.store.recent_keys(self.settings.cooldown).await?;
        let selections = self
            .selector
            .select(candidates, &recent, self.settings.top_k)
            .await?;
        summary.selected = selections.len();
        summary.skipped = summary.processed.saturating_sub(summary.selected);

        self.set_stage(Stage::Composing);
        let drafts = self
            .compose_all(selections, Local::now().date_naive(), &mut summary)
            .await?;

        self.set_stage(Stage::Publishing);
        self.publish_all(drafts, &mut summary).await?;

        Ok(summary)
    }

    /// Compose every selection, enriching ranked posts first.
    pub async fn compose_all(
        &self,
        selections: Vec<Selection>,
        date: NaiveDate,
        summary: &mut CycleSummary,
    ) -> KizashiResult<Vec<Draft>> {
        let budget = self.budget();
        let mut drafts = Vec::with_capacity(selections.len());

        for selection in selections {
            let rank = *selection.rank();
            let candidate = selection.into_candidate();
            let candidate = match self.prepare(candidate).await {
                Ok(candidate) => candidate,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Skipping candidate after enrichment failure");
                    summary.skipped += 1;
                    continue;
                }
            };

            let text = self
                .settings
                .shape
                .compose(&candidate, rank, date)
                .render(&budget);
            debug!(key = %candidate.key(), length = text.chars().count(), "Composed");
            drafts.push(Draft {
                key: candidate.key().to_string(),
                rank,
                text,
            });
        }
        Ok(drafts)
    }

    async fn prepare(&self, candidate: Candidate) -> KizashiResult<Candidate> {
        match self.settings.shape {
            PostShape::Ranked if candidate.key_point().is_none() => {
                self.enricher.enrich(candidate).await
            }
            PostShape::Signal if Enricher::needs_localization(&candidate) => {
                self.enricher.localize(candidate).await
            }
            _ => Ok(candidate),
        }
    }

    async fn publish_all(&self, drafts: Vec<Draft>, summary: &mut CycleSummary) -> KizashiResult<()> {
        let mut first = true;
        for draft in drafts {
            // Another trigger may have posted this key since selection.
            if self
                .store
                .is_recently_published(&draft.key, self.settings.cooldown)
                .await?
            {
                debug!(key = %draft.key, "Already published, skipping");
                summary.skipped += 1;
                continue;
            }

            if !first && !self.settings.pause_between_posts.is_zero() {
                tokio::time::sleep(self.settings.pause_between_posts).await;
            }
            first = false;

            match self.publisher.publish(&draft.text).await {
                Ok(receipt) => {
                    info!(
                        key = %draft.key,
                        rank = draft.rank,
                        post_id = %receipt.post_id(),
                        platform = %receipt.platform(),
                        "Published"
                    );
                    self.store
                        .record_published(PublishRecord::from_receipt(draft.key, &receipt))
                        .await?;
                    self.metrics.record_post();
                    summary.posted += 1;
                }
                Err(e) => {
                    warn!(key = %draft.key, error = %e, "Publish failed, candidate stays eligible");
                    self.metrics.record_publish_failure();
                    summary.failed += 1;
                }
            }
        }
        Ok(())
    }

    fn set_stage(&self, stage: Stage) {
        let mut current = self.stage.lock();
        if *current != stage {
            debug!(from = %*current, to = %stage, "Stage transition");
            *current = stage;
        }
    }
}
