//! Pipeline, selection and scheduling for the Kizashi publishing bot.
//!
//! A [`Scheduler`] fires a [`Pipeline`] cycle at a fixed interval. Each
//! cycle picks a source by hour bucket ([`SourceRotation`]), fetches
//! candidates, drops the ones published inside the cooldown window, asks
//! the generation client for a Top-K ([`Selector`]), composes each pick
//! through a [`PostShape`] and the shared text budget, publishes it, and
//! records only confirmed posts in the dedup ledger.
//!
//! Settings come from [`KizashiConfig`], which layers the bundled
//! `kizashi.toml`, user files and `KIZASHI__*` environment variables.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod enrichment;
mod metrics;
mod pipeline;
mod rotation;
mod scheduler;
mod selector;
mod shapes;
mod sources;

pub use config::{
    ComposeConfig, DedupBackend, DedupConfig, GenerationConfig, KizashiConfig, Platform, Provider,
    PublisherConfig, ScheduleConfig, SelectionConfig, SourceConfig,
};
pub use enrichment::{Enricher, contains_japanese};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use pipeline::{
    CycleSummary, Draft, Pipeline, PipelineSettings, PipelineSettingsBuilder, Stage,
};
pub use rotation::{SourceRotation, rotation_index};
pub use scheduler::Scheduler;
pub use selector::{Selection, Selector};
pub use shapes::PostShape;
pub use sources::{FileSource, ResearchSource, research_prompt};
