//! Generative backends for Kizashi.
//!
//! Backends implement [`GenerativeBackend`](kizashi_interface::GenerativeBackend)
//! and make exactly one HTTP call per invocation. The [`GenerationClient`]
//! wraps a primary backend (and optionally a fallback) with exponential
//! backoff, failure classification and an optional request-rate limit.
//!
//! # Available Backends
//!
//! - **OpenAI** chat completions ([`OpenAiBackend`])
//! - **Gemini** `generateContent` REST API ([`GeminiBackend`])
//!
//! # Example
//!
//! ```no_run
//! use kizashi_core::GenerationRequest;
//! use kizashi_models::{GenerationClient, OpenAiBackend, RetryPolicy};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let primary = Arc::new(OpenAiBackend::from_env("gpt-4o-mini-search-preview")?);
//! let fallback = Arc::new(OpenAiBackend::from_env("gpt-4o-search-preview")?);
//!
//! let client = GenerationClient::new(primary, RetryPolicy::default()).with_fallback(fallback);
//! let result = client
//!     .generate(&GenerationRequest::prompt_only("Find recent AI news"))
//!     .await?;
//! println!("{} ({} attempts)", result.text(), result.attempts());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod gemini;
mod http;
mod openai;
mod retry;

pub use client::GenerationClient;
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use retry::RetryPolicy;
