//! OpenAI chat completions backend.

use crate::http::{status_error, transport_error};
use async_trait::async_trait;
use kizashi_core::GenerationRequest;
use kizashi_error::{ConfigError, FailureClass, UpstreamError};
use kizashi_interface::GenerativeBackend;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat completions client.
///
/// Works against any OpenAI-compatible endpoint via
/// [`OpenAiBackend::with_base_url`].
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiBackend {
    /// Creates a new OpenAI backend with a 60 second request timeout.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model identifier (e.g., "gpt-4o-mini")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(api_key, model, Duration::from_secs(60))
    }

    /// Creates a backend whose requests time out after `timeout`.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        debug!(timeout_secs = timeout.as_secs(), "Creating new OpenAI backend");
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            url: OPENAI_API_URL.to_string(),
        }
    }

    /// Creates a backend from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::new("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    /// Point the backend at another chat completions endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    #[instrument(skip(self, req), fields(model = %self.model))]
    async fn generate(&self, req: &GenerationRequest) -> Result<String, UpstreamError> {
        let model = req.model().as_deref().unwrap_or(&self.model);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = req.system() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: req.prompt(),
        });

        let body = ChatRequest {
            model,
            messages,
            temperature: *req.temperature(),
            max_tokens: *req.max_tokens(),
        };

        debug!(model, "Sending request to OpenAI API");
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            UpstreamError::new(
                FailureClass::Other,
                format!("Failed to parse OpenAI response: {}", e),
            )
        })?;

        chat.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| UpstreamError::new(FailureClass::Other, "OpenAI returned no content"))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
