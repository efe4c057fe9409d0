//! Bluesky publisher over AT protocol XRPC.

use crate::{ensure_fits, link_facets};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use kizashi_core::PostReceipt;
use kizashi_error::{ConfigError, PublishError, PublishErrorKind};
use kizashi_interface::Publisher;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_SERVICE: &str = "https://bsky.social";
const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

/// Bluesky publisher.
///
/// The session from `com.atproto.server.createSession` is cached and reused
/// until the server rejects it, after which the next publish signs in again.
/// Posts carry link facets so URLs render as links.
#[derive(Debug)]
pub struct BlueskyPublisher {
    client: Client,
    service: String,
    handle: String,
    app_password: String,
    max_length: usize,
    session: Mutex<Option<Session>>,
}

impl BlueskyPublisher {
    /// Creates a publisher for `handle`, authenticating with an app password.
    pub fn new(handle: impl Into<String>, app_password: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            service: DEFAULT_SERVICE.to_string(),
            handle: handle.into(),
            app_password: app_password.into(),
            max_length: 300,
            session: Mutex::new(None),
        }
    }

    /// Creates a publisher from `BLUESKY_HANDLE` and `BLUESKY_APP_PASSWORD`.
    ///
    /// A configured `handle` takes precedence over the environment.
    pub fn from_env(handle: Option<&str>) -> Result<Self, ConfigError> {
        let handle = match handle {
            Some(handle) => handle.to_string(),
            None => std::env::var("BLUESKY_HANDLE")
                .map_err(|_| ConfigError::new("BLUESKY_HANDLE environment variable not set"))?,
        };
        let password = std::env::var("BLUESKY_APP_PASSWORD")
            .map_err(|_| ConfigError::new("BLUESKY_APP_PASSWORD environment variable not set"))?;
        Ok(Self::new(handle, password))
    }

    /// Use another PDS.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the post length limit.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    #[instrument(skip(self), fields(handle = %self.handle))]
    async fn session(&self) -> Result<Session, PublishError> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        debug!("Creating Bluesky session");
        let response = self
            .client
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &self.handle,
                password: &self.app_password,
            })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Bluesky sign-in failed");
            return Err(PublishError::new(PublishErrorKind::Authentication(format!(
                "{}: {}",
                status, body
            ))));
        }

        let session: Session = response.json().await.map_err(|e| {
            PublishError::new(PublishErrorKind::Authentication(format!(
                "Malformed session response: {}",
                e
            )))
        })?;
        info!(did = %session.did, "Bluesky session created");
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn invalidate_session(&self) {
        *self.session.lock().await = None;
    }
}

fn transport(err: reqwest::Error) -> PublishError {
    error!(error = ?err, "Bluesky request failed");
    PublishError::new(PublishErrorKind::Transport(err.to_string()))
}

/// The `app.bsky.feed.post` record for `text`.
fn post_record(text: &str) -> serde_json::Value {
    let facets: Vec<_> = link_facets(text)
        .into_iter()
        .map(|facet| {
            json!({
                "index": { "byteStart": facet.byte_start, "byteEnd": facet.byte_end },
                "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": facet.uri }],
            })
        })
        .collect();

    let mut record = json!({
        "$type": POST_COLLECTION,
        "text": text,
        "createdAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    if !facets.is_empty() {
        record["facets"] = serde_json::Value::Array(facets);
    }
    record
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    #[instrument(skip(self, text), fields(handle = %self.handle, length = text.chars().count()))]
    async fn publish(&self, text: &str) -> Result<PostReceipt, PublishError> {
        ensure_fits(text, self.max_length)?;
        let session = self.session().await?;

        let response = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": session.did,
                "collection": POST_COLLECTION,
                "record": post_record(text),
            }))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Bluesky rejected post");
            if status == StatusCode::UNAUTHORIZED || body.contains("ExpiredToken") {
                warn!("Dropping cached Bluesky session");
                self.invalidate_session().await;
                return Err(PublishError::new(PublishErrorKind::Authentication(body)));
            }
            return Err(PublishError::new(PublishErrorKind::Rejected(format!(
                "{}: {}",
                status, body
            ))));
        }

        let created: CreateRecordResponse = response.json().await.map_err(|e| {
            PublishError::new(PublishErrorKind::Rejected(format!(
                "Malformed createRecord response: {}",
                e
            )))
        })?;
        info!(uri = %created.uri, "Posted to Bluesky");
        Ok(PostReceipt::new(created.uri, "bluesky"))
    }

    fn platform(&self) -> &str {
        "bluesky"
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}
