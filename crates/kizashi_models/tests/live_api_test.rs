//! Calls real model endpoints. Run with `--features api` and keys in `.env`.

use kizashi_core::GenerationRequest;
use kizashi_models::{GeminiBackend, GenerationClient, OpenAiBackend, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;

fn policy() -> RetryPolicy {
    RetryPolicy::new(Duration::from_secs(2), 2)
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_live_generation() {
    dotenvy::dotenv().ok();
    let backend = OpenAiBackend::from_env("gpt-4o-mini").expect("OPENAI_API_KEY must be set");
    let client = GenerationClient::new(Arc::new(backend), policy());

    let result = client
        .generate(&GenerationRequest::prompt_only("Reply with the single word: ok").with_temperature(0.0))
        .await
        .unwrap();

    assert!(!result.into_text().trim().is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_live_generation() {
    dotenvy::dotenv().ok();
    let backend = GeminiBackend::from_env("gemini-2.0-flash").expect("GEMINI_API_KEY must be set");
    let client = GenerationClient::new(Arc::new(backend), policy());

    let result = client
        .generate(&GenerationRequest::prompt_only("Reply with the single word: ok"))
        .await
        .unwrap();

    assert!(!result.into_text().trim().is_empty());
}
