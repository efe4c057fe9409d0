//! Building the pipeline's collaborators from configuration.

use kizashi_bot::{
    DedupBackend, KizashiConfig, Pipeline, Platform, Provider, ResearchSource, SourceRotation,
};
use kizashi_error::{ConfigError, KizashiResult};
use kizashi_interface::{DedupStore, GenerativeBackend, Publisher};
use kizashi_models::{GeminiBackend, GenerationClient, OpenAiBackend, RetryPolicy};
use kizashi_social::{BlueskyPublisher, DemoPublisher};
use kizashi_storage::{InMemoryDedupStore, JsonDedupStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Connections kept open by the PostgreSQL ledger.
#[cfg(feature = "database")]
const DATABASE_POOL_SIZE: u32 = 4;

fn api_key(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))
}

fn backend(
    provider: Provider,
    model: &str,
    timeout: Duration,
) -> Result<Arc<dyn GenerativeBackend>, ConfigError> {
    let backend: Arc<dyn GenerativeBackend> = match provider {
        Provider::OpenAi => Arc::new(OpenAiBackend::with_timeout(
            api_key("OPENAI_API_KEY")?,
            model,
            timeout,
        )),
        Provider::Gemini => Arc::new(GeminiBackend::with_timeout(
            api_key("GEMINI_API_KEY")?,
            model,
            timeout,
        )),
    };
    Ok(backend)
}

/// Generation client with retry, optional fallback, timeout and rate limit.
///
/// # Errors
///
/// Returns error if the provider's API key is not set.
#[instrument(skip(config), fields(provider = %config.generation.provider))]
pub fn build_client(config: &KizashiConfig) -> KizashiResult<GenerationClient> {
    let generation = &config.generation;
    let timeout = Duration::from_secs(generation.timeout_secs);

    let policy = RetryPolicy::new(
        Duration::from_millis(generation.base_delay_ms),
        generation.max_retries,
    )
    .with_jitter(generation.jitter);

    let primary = backend(generation.provider, &generation.primary_model, timeout)?;
    let mut client = GenerationClient::new(primary, policy).with_timeout(timeout);

    if let Some(model) = &generation.fallback_model {
        client = client.with_fallback(backend(generation.provider, model, timeout)?);
    }
    if generation.requests_per_minute > 0 {
        client = client.with_rate_limit(generation.requests_per_minute);
    }

    info!(
        primary = %generation.primary_model,
        fallback = ?generation.fallback_model,
        max_retries = generation.max_retries,
        "Generation client ready"
    );
    Ok(client)
}

/// Dedup ledger for the configured backend.
///
/// # Errors
///
/// Returns error if the ledger cannot be opened, or the PostgreSQL backend
/// is selected in a build without the `database` feature.
#[instrument(skip(config), fields(backend = %config.dedup.backend))]
pub async fn build_store(config: &KizashiConfig) -> KizashiResult<Arc<dyn DedupStore>> {
    let store: Arc<dyn DedupStore> = match config.dedup.backend {
        DedupBackend::Json => Arc::new(JsonDedupStore::open(&config.dedup.ledger_path).await?),
        DedupBackend::Memory => Arc::new(InMemoryDedupStore::new()),
        #[cfg(feature = "database")]
        DedupBackend::Postgres => Arc::new(
            kizashi_storage::PostgresDedupStore::from_env(DATABASE_POOL_SIZE).await?,
        ),
        #[cfg(not(feature = "database"))]
        DedupBackend::Postgres => {
            return Err(ConfigError::new(
                "dedup.backend = \"postgres\" requires the `database` feature",
            )
            .into());
        }
    };
    Ok(store)
}

/// Publisher for the configured platform.
///
/// # Errors
///
/// Returns error if Bluesky credentials are missing.
pub fn build_publisher(config: &KizashiConfig) -> KizashiResult<Arc<dyn Publisher>> {
    let publisher: Arc<dyn Publisher> = match config.publisher.platform {
        Platform::Demo => Arc::new(DemoPublisher::new()),
        Platform::Bluesky => Arc::new(BlueskyPublisher::from_env(
            config.publisher.handle.as_deref(),
        )?),
    };
    Ok(publisher)
}

/// Assemble the full pipeline from a validated configuration.
///
/// # Errors
///
/// Returns error if any collaborator cannot be built.
pub async fn build_pipeline(config: &KizashiConfig) -> KizashiResult<Pipeline> {
    let client = Arc::new(build_client(config)?);
    let store = build_store(config).await?;
    let publisher = build_publisher(config)?;
    let source = Arc::new(ResearchSource::new(client.clone()));
    let rotation = SourceRotation::new(config.source_descriptors(), config.schedule.bucket_hours);

    Ok(Pipeline::new(
        rotation,
        source,
        client,
        publisher,
        store,
        config.pipeline_settings()?,
    ))
}
