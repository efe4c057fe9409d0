//! Failure classification shared by the HTTP backends.

use kizashi_error::{FailureClass, UpstreamError};
use reqwest::Response;
use tracing::error;

/// Classify a transport-level reqwest failure.
#[track_caller]
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> UpstreamError {
    error!(provider, error = ?err, "Request failed before a response arrived");
    let message = format!("{} request failed: {}", provider, err);
    if err.is_timeout() {
        UpstreamError::new(FailureClass::Timeout, message)
    } else if let Some(status) = err.status() {
        UpstreamError::from_status(status.as_u16(), message)
    } else {
        UpstreamError::from_message(message)
    }
}

/// Classify a non-success response from its status, falling back to the
/// body text when the status alone is inconclusive.
pub(crate) async fn status_error(provider: &str, response: Response) -> UpstreamError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error!(provider, status, body = %body, "API returned error");

    let class = match FailureClass::from_status(status) {
        FailureClass::Other => FailureClass::from_message(&body),
        class => class,
    };
    UpstreamError::new(class, format!("{} API error {}: {}", provider, status, body))
}
