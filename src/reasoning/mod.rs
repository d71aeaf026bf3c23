//! Remote reasoning service: one prompt in, free text out.
//!
//! Backends sit behind [`ReasoningClient`] so the consultation pipeline can be
//! exercised without a network. No retries anywhere: a single failure is
//! reported to the caller, which substitutes the fallback report.

pub mod gemini;
pub mod ollama;
#[cfg(test)]
pub mod mock;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{ReasoningConfig, ReasoningProvider};

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasoningError {
    #[error("No API key configured for the reasoning service")]
    MissingCredentials,

    #[error("Reasoning service is not reachable at {0}")]
    Connection(String),

    #[error("Reasoning service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Reasoning service returned no text")]
    EmptyResponse,

    #[error("Prompt was blocked by the reasoning service: {0}")]
    Blocked(String),
}

/// Sampling knobs sent with every request. Fixed, not user-facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

pub const CONSULTATION_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.7,
    top_p: 0.8,
    top_k: 40,
    max_output_tokens: 2048,
};

/// Prompt-completion client abstraction (allows mocking).
pub trait ReasoningClient: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        settings: &GenerationSettings,
    ) -> Result<String, ReasoningError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Build the configured backend.
pub fn build_reasoning_client(
    config: &ReasoningConfig,
) -> Result<Box<dyn ReasoningClient>, ReasoningError> {
    match config.provider {
        ReasoningProvider::Gemini => {
            if config.api_key.is_none() {
                tracing::warn!(
                    "GOOGLE_API_KEY is not set; every consultation will use the fallback report"
                );
            }
            Ok(Box::new(GeminiClient::new(
                &config.gemini_url,
                &config.gemini_model,
                config.api_key.clone(),
            )?))
        }
        ReasoningProvider::Ollama => Ok(Box::new(OllamaClient::new(
            &config.ollama_url,
            &config.ollama_model,
        )?)),
    }
}

pub(crate) fn http_client() -> Result<reqwest::blocking::Client, ReasoningError> {
    reqwest::blocking::Client::builder()
        .build()
        .map_err(|e| ReasoningError::HttpClient(e.to_string()))
}

pub(crate) fn map_transport_error(err: reqwest::Error, base_url: &str) -> ReasoningError {
    if err.is_connect() {
        ReasoningError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        ReasoningError::HttpClient("Request timed out".into())
    } else {
        // Strip the URL: it may carry query parameters we do not want in logs.
        ReasoningError::HttpClient(err.without_url().to_string())
    }
}

/// Check status and decode a JSON body.
pub(crate) fn read_json<R: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<R, ReasoningError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ReasoningError::Service {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .map_err(|e| ReasoningError::ResponseParsing(e.without_url().to_string()))
}
