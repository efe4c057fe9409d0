//! Layered configuration for the bot.

use crate::{PipelineSettings, PipelineSettingsBuilder, PostShape};
use config::{Config, Environment, File, FileFormat};
use kizashi_core::SourceDescriptor;
use kizashi_error::{ConfigError, KizashiError, KizashiResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../kizashi.toml");

/// Complete bot configuration.
///
/// Loaded from layered sources, later ones overriding earlier ones:
/// 1. Bundled defaults (`kizashi.toml` shipped with the crate)
/// 2. `~/.config/kizashi/kizashi.toml`
/// 3. `./kizashi.toml`, or an explicit path
/// 4. `KIZASHI__SECTION__KEY` environment variables
///
/// # Example
///
/// ```no_run
/// use kizashi_bot::KizashiConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = KizashiConfig::load(None)?;
/// config.validate()?;
/// println!("top_k = {}", config.selection.top_k);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KizashiConfig {
    /// Cycle timing and source rotation
    pub schedule: ScheduleConfig,
    /// Dedup ledger
    pub dedup: DedupConfig,
    /// Generative backends and retry policy
    pub generation: GenerationConfig,
    /// Candidate selection
    pub selection: SelectionConfig,
    /// Post composition
    pub compose: ComposeConfig,
    /// Publishing target
    pub publisher: PublisherConfig,
    /// Sources rotated through by hour bucket
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Cycle timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Minutes between cycles
    pub interval_minutes: u64,
    /// Hours per source rotation bucket
    pub bucket_hours: u32,
    /// Run a cycle at startup instead of waiting a full interval
    #[serde(default)]
    pub run_on_start: bool,
}

/// Dedup ledger backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DedupBackend {
    /// JSON ledger file
    #[default]
    Json,
    /// Process memory only
    Memory,
    /// PostgreSQL `publish_records` table (`DATABASE_URL`)
    Postgres,
}

/// Dedup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Hours a published url stays ineligible
    pub cooldown_hours: u32,
    /// Backend
    #[serde(default)]
    pub backend: DedupBackend,
    /// Ledger file for the JSON backend
    pub ledger_path: PathBuf,
}

/// Generative provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions (`OPENAI_API_KEY`)
    #[default]
    OpenAi,
    /// Gemini generateContent (`GEMINI_API_KEY`)
    Gemini,
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider for both models
    #[serde(default)]
    pub provider: Provider,
    /// Model tried first
    pub primary_model: String,
    /// Model tried once when the primary is unavailable
    #[serde(default)]
    pub fallback_model: Option<String>,
    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,
    /// Total attempts per logical call
    pub max_retries: u32,
    /// Per-attempt timeout, in seconds
    pub timeout_secs: u64,
    /// Outgoing request limit; 0 disables it
    #[serde(default)]
    pub requests_per_minute: u32,
    /// Randomize backoff delays
    #[serde(default)]
    pub jitter: bool,
}

/// Selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Posts per cycle
    pub top_k: usize,
    /// Candidates requested from the source
    pub fetch_limit: usize,
    /// Pause between consecutive publishes, in seconds
    #[serde(default)]
    pub pause_between_posts_secs: u64,
}

/// Composition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Post layout
    #[serde(default)]
    pub shape: PostShape,
    /// Overrides the publisher's limit when set
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Marks truncated text
    pub ellipsis: String,
}

/// Publishing platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    /// Bluesky (`BLUESKY_HANDLE`, `BLUESKY_APP_PASSWORD`)
    Bluesky,
    /// Log only
    #[default]
    Demo,
}

/// Publisher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Target platform
    #[serde(default)]
    pub platform: Platform,
    /// Account handle; `BLUESKY_HANDLE` is used when absent
    #[serde(default)]
    pub handle: Option<String>,
}

/// One rotated source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used in logs
    pub name: String,
    /// Themes researched for this source
    pub themes: Vec<String>,
}

impl From<&SourceConfig> for SourceDescriptor {
    fn from(source: &SourceConfig) -> Self {
        SourceDescriptor::new(source.name.clone(), source.themes.iter().cloned())
    }
}

impl KizashiConfig {
    /// The bundled defaults alone.
    pub fn defaults() -> KizashiResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration with precedence:
    /// environment > explicit path or `./kizashi.toml` > home config > bundled defaults.
    ///
    /// An explicit `path` must exist; the other files are optional.
    #[instrument]
    pub fn load(path: Option<&Path>) -> KizashiResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/kizashi/kizashi.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("kizashi").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("KIZASHI")
                .separator("__")
                .try_parsing(true),
        );

        Self::build(builder)
    }

    /// Load a single file layered over the bundled defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> KizashiResult<Self> {
        Self::build(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    fn build(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> KizashiResult<Self> {
        builder
            .build()
            .map_err(|e| {
                KizashiError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                KizashiError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// An interval shorter than the cooldown is allowed but logged, since
    /// back-to-back cycles will find most recent candidates still cooling
    /// down.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.top_k == 0 {
            return Err(ConfigError::new("selection.top_k must be at least 1"));
        }
        if self.generation.max_retries == 0 {
            return Err(ConfigError::new("generation.max_retries must be at least 1"));
        }
        if self.schedule.bucket_hours == 0 {
            return Err(ConfigError::new("schedule.bucket_hours must be at least 1"));
        }
        if self.schedule.interval_minutes == 0 {
            return Err(ConfigError::new("schedule.interval_minutes must be at least 1"));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::new("at least one [[sources]] entry is required"));
        }
        if let Some(source) = self.sources.iter().find(|s| s.themes.is_empty()) {
            return Err(ConfigError::new(format!(
                "source '{}' has no themes",
                source.name
            )));
        }
        if self.compose.max_length == Some(0) {
            return Err(ConfigError::new("compose.max_length must be at least 1"));
        }

        let interval = self.interval();
        let cooldown = Duration::from_secs(u64::from(self.dedup.cooldown_hours) * 3600);
        if interval < cooldown {
            warn!(
                interval_minutes = self.schedule.interval_minutes,
                cooldown_hours = self.dedup.cooldown_hours,
                "Cycle interval is shorter than the dedup cooldown; recently posted items stay ineligible across several cycles"
            );
        }
        Ok(())
    }

    /// Time between cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_minutes * 60)
    }

    /// Rolling dedup window.
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.dedup.cooldown_hours))
    }

    /// Source descriptors in rotation order.
    pub fn source_descriptors(&self) -> Vec<SourceDescriptor> {
        self.sources.iter().map(SourceDescriptor::from).collect()
    }

    /// Pipeline tunables drawn from the selection, compose and dedup sections.
    pub fn pipeline_settings(&self) -> KizashiResult<PipelineSettings> {
        let mut builder = PipelineSettingsBuilder::default();
        builder
            .top_k(self.selection.top_k)
            .fetch_limit(self.selection.fetch_limit)
            .cooldown(self.cooldown())
            .shape(self.compose.shape)
            .ellipsis(self.compose.ellipsis.clone())
            .pause_between_posts(Duration::from_secs(
                self.selection.pause_between_posts_secs,
            ));
        if let Some(max_length) = self.compose.max_length {
            builder.max_length(max_length);
        }
        builder.build().map_err(|e| {
            KizashiError::from(ConfigError::new(format!(
                "Invalid pipeline settings: {}",
                e
            )))
        })
    }
}
