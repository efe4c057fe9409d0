//! Retry, backoff and fallback behavior of the generation client.

mod test_utils;

use kizashi_core::{GenerationRequest, GenerationRequestBuilder};
use kizashi_error::{FailureClass, KizashiErrorKind};
use kizashi_models::{GenerationClient, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{ScriptedBackend, Step};

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(Duration::from_millis(100), max_retries)
}

fn request() -> GenerationRequest {
    GenerationRequest::prompt_only("Rank these articles")
}

fn upstream_class(err: &kizashi_error::KizashiError) -> Option<FailureClass> {
    match err.kind() {
        KizashiErrorKind::Upstream(e) => Some(e.class),
        _ => None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_retryable_failures_then_success_backs_off_exponentially() {
    let primary = Arc::new(ScriptedBackend::new(
        "primary",
        vec![
            Step::Fail(FailureClass::ServerError),
            Step::Fail(FailureClass::RateLimited),
            Step::Reply("ranked"),
        ],
    ));
    let client = GenerationClient::new(primary.clone(), policy(3));

    let result = client.generate(&request()).await.unwrap();

    assert_eq!(result.text(), "ranked");
    assert_eq!(*result.attempts(), 3);
    assert!(!result.used_fallback());
    assert_eq!(*result.last_failure(), Some(FailureClass::RateLimited));

    let calls = primary.call_times();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1] - calls[0], Duration::from_millis(100));
    assert_eq!(calls[2] - calls[1], Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_records_no_failure() {
    let primary = Arc::new(ScriptedBackend::always("primary", Step::Reply("ok")));
    let client = GenerationClient::new(primary.clone(), policy(3));

    let result = client.generate(&request()).await.unwrap();

    assert_eq!(*result.attempts(), 1);
    assert_eq!(*result.last_failure(), None);
    assert_eq!(result.model(), "primary");
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_error() {
    let primary = Arc::new(ScriptedBackend::new(
        "primary",
        vec![
            Step::Fail(FailureClass::ServerError),
            Step::Fail(FailureClass::ServerError),
            Step::Fail(FailureClass::Timeout),
        ],
    ));
    let client = GenerationClient::new(primary.clone(), policy(3));

    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(primary.call_count(), 3);
    assert_eq!(upstream_class(&err), Some(FailureClass::Timeout));
    assert!(!err.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn test_bad_request_is_surfaced_without_retry() {
    let primary = Arc::new(ScriptedBackend::always(
        "primary",
        Step::Fail(FailureClass::BadRequest),
    ));
    let fallback = Arc::new(ScriptedBackend::always("fallback", Step::Reply("unused")));
    let client =
        GenerationClient::new(primary.clone(), policy(3)).with_fallback(fallback.clone());

    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 0);
    assert!(err.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn test_not_found_switches_to_fallback_exactly_once() {
    let primary = Arc::new(ScriptedBackend::always(
        "gpt-4o-mini-search-preview",
        Step::Fail(FailureClass::NotFound),
    ));
    let fallback = Arc::new(ScriptedBackend::always(
        "gpt-4o-search-preview",
        Step::Reply("from fallback"),
    ));
    let client =
        GenerationClient::new(primary.clone(), policy(3)).with_fallback(fallback.clone());

    let result = client.generate(&request()).await.unwrap();

    assert_eq!(result.text(), "from fallback");
    assert!(result.used_fallback());
    assert_eq!(result.model(), "gpt-4o-search-preview");
    assert_eq!(*result.attempts(), 2);
    assert_eq!(*result.last_failure(), Some(FailureClass::NotFound));
    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_does_not_inherit_model_override() {
    let primary = Arc::new(ScriptedBackend::always(
        "primary",
        Step::Fail(FailureClass::NotFound),
    ));
    let fallback = Arc::new(ScriptedBackend::always("fallback", Step::Reply("ok")));
    let client =
        GenerationClient::new(primary.clone(), policy(3)).with_fallback(fallback.clone());
    let request = GenerationRequestBuilder::default()
        .prompt("Summarize")
        .model("retired-model")
        .build()
        .unwrap();

    client.generate(&request).await.unwrap();

    assert_eq!(primary.models_seen(), vec![Some("retired-model".to_string())]);
    assert_eq!(fallback.models_seen(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fallback_is_not_retried() {
    let primary = Arc::new(ScriptedBackend::always(
        "primary",
        Step::Fail(FailureClass::NotFound),
    ));
    let fallback = Arc::new(ScriptedBackend::always(
        "fallback",
        Step::Fail(FailureClass::ServerError),
    ));
    let client =
        GenerationClient::new(primary.clone(), policy(3)).with_fallback(fallback.clone());

    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(fallback.call_count(), 1);
    assert_eq!(upstream_class(&err), Some(FailureClass::ServerError));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_without_fallback_fails() {
    let primary = Arc::new(ScriptedBackend::always(
        "primary",
        Step::Fail(FailureClass::NotFound),
    ));
    let client = GenerationClient::new(primary.clone(), policy(3));

    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(primary.call_count(), 1);
    assert_eq!(upstream_class(&err), Some(FailureClass::NotFound));
}

#[tokio::test(start_paused = true)]
async fn test_attempt_timeout_is_retryable() {
    let primary = Arc::new(ScriptedBackend::always(
        "primary",
        Step::Stall(Duration::from_secs(30)),
    ));
    let client = GenerationClient::new(primary.clone(), policy(2))
        .with_timeout(Duration::from_secs(5));

    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(primary.call_count(), 2);
    assert_eq!(upstream_class(&err), Some(FailureClass::Timeout));
}

#[tokio::test(start_paused = true)]
async fn test_attempt_counter_is_per_call() {
    let primary = Arc::new(ScriptedBackend::new(
        "primary",
        vec![
            Step::Fail(FailureClass::ServerError),
            Step::Reply("first"),
            Step::Reply("second"),
        ],
    ));
    let client = GenerationClient::new(primary.clone(), policy(3));

    let first = client.generate(&request()).await.unwrap();
    let second = client.generate(&request()).await.unwrap();

    assert_eq!(*first.attempts(), 2);
    assert_eq!(*second.attempts(), 1);
}
