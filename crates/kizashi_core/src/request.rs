//! Generation request and result types.

use derive_getters::Getters;
use kizashi_error::FailureClass;
use serde::{Deserialize, Serialize};

/// A prompt for a generative backend.
///
/// # Examples
///
/// ```
/// use kizashi_core::GenerationRequestBuilder;
///
/// let request = GenerationRequestBuilder::default()
///     .prompt("Rank these articles")
///     .temperature(0.2)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.prompt(), "Rank these articles");
/// assert!(request.model().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// User prompt.
    prompt: String,

    /// Optional system instruction.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    system: Option<String>,

    /// Sampling temperature.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    temperature: Option<f32>,

    /// Output token ceiling.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    max_tokens: Option<u32>,

    /// Model override; backends use their configured model when absent.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    model: Option<String>,
}

impl GenerationRequest {
    /// Request with only a prompt.
    pub fn prompt_only(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
            model: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Copy of this request that uses the backend's own model.
    pub fn without_model(&self) -> Self {
        Self {
            model: None,
            ..self.clone()
        }
    }
}

/// Output of a logical generation call.
///
/// `attempts` counts every backend call made for this request, fallback
/// included; `last_failure` is the class of the most recent failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GenerationResult {
    /// Generated text.
    text: String,
    /// Model that produced the text.
    model: String,
    /// Backend calls made.
    attempts: u32,
    /// Whether the fallback backend produced the text.
    used_fallback: bool,
    /// Class of the last failed attempt, if any.
    last_failure: Option<FailureClass>,
}

impl GenerationResult {
    /// Create a result.
    pub fn new(
        text: impl Into<String>,
        model: impl Into<String>,
        attempts: u32,
        used_fallback: bool,
        last_failure: Option<FailureClass>,
    ) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            attempts,
            used_fallback,
            last_failure,
        }
    }

    /// Consume the result, keeping the text.
    pub fn into_text(self) -> String {
        self.text
    }
}
