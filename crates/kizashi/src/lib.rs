//! Kizashi - scheduled weak-signal news bot.
//!
//! Every interval Kizashi asks a search-capable model for recent articles
//! on a rotating set of themes, ranks them, composes posts that fit the
//! platform's character limit, and publishes them. A dedup ledger keeps
//! an article from being posted twice inside the cooldown window.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kizashi::{KizashiConfig, build_pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KizashiConfig::load(None)?;
//!     config.validate()?;
//!
//!     let pipeline = build_pipeline(&config).await?;
//!     let summary = pipeline.run_cycle().await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `database` - PostgreSQL dedup ledger
//!
//! # Architecture
//!
//! - `kizashi_error` - Error types and failure classification
//! - `kizashi_core` - Candidates, requests, records and the text budget
//! - `kizashi_interface` - Collaborator traits
//! - `kizashi_parse` - Research text and model JSON extraction
//! - `kizashi_models` - OpenAI and Gemini backends, retry and fallback
//! - `kizashi_storage` - Dedup ledger backends
//! - `kizashi_social` - Bluesky and demo publishers
//! - `kizashi_bot` - Pipeline, selection, rotation and scheduling
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assemble;
mod telemetry;

pub use assemble::{build_client, build_pipeline, build_publisher, build_store};
pub use telemetry::init_telemetry;

pub use kizashi_error::{
    ConfigError, FailureClass, KizashiError, KizashiErrorKind, KizashiResult, ParseError,
    ParseErrorKind, PublishError, PublishErrorKind, RetryableError, StorageError,
    StorageErrorKind, UpstreamError, ValidationError, ValidationErrorKind,
};

pub use kizashi_core::{
    Candidate, CandidateBuilder, ComposedPost, GenerationRequest, GenerationResult, PostId,
    PostReceipt, PublishRecord, Segment, SourceDescriptor, TextBudget, truncate_with_ellipsis,
};

pub use kizashi_interface::{ContentSource, DedupStore, GenerativeBackend, Publisher};

pub use kizashi_parse::{CandidateParser, ParseReport, canonical_url, parse_json, validate_candidate};

pub use kizashi_models::{GeminiBackend, GenerationClient, OpenAiBackend, RetryPolicy};

pub use kizashi_storage::{InMemoryDedupStore, JsonDedupStore};

#[cfg(feature = "database")]
pub use kizashi_storage::PostgresDedupStore;

pub use kizashi_social::{BlueskyPublisher, DemoPublisher};

pub use kizashi_bot::{
    CycleSummary, DedupBackend, FileSource, KizashiConfig, MetricsSnapshot, Pipeline,
    PipelineMetrics, PipelineSettings, Platform, PostShape, Provider, ResearchSource, Scheduler,
    Selection, Selector, SourceRotation, Stage,
};
