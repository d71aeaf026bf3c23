use serde::{Deserialize, Serialize};

use super::{
    http_client, map_transport_error, read_json, GenerationSettings, ReasoningClient,
    ReasoningError,
};

/// Ollama HTTP client for a locally hosted model.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, ReasoningError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: http_client()?,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl ReasoningClient for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        settings: &GenerationSettings,
    ) -> Result<String, ReasoningError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: OllamaOptions {
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
                num_predict: settings.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        let parsed: OllamaGenerateResponse = read_json(response)?;
        if parsed.response.trim().is_empty() {
            return Err(ReasoningError::EmptyResponse);
        }
        Ok(parsed.response)
    }

    fn backend(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::CONSULTATION_SETTINGS;

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "medgemma:latest").unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model, "medgemma:latest");
    }

    #[test]
    fn request_maps_settings_to_options() {
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            system: "s",
            stream: false,
            options: OllamaOptions {
                temperature: CONSULTATION_SETTINGS.temperature,
                top_p: CONSULTATION_SETTINGS.top_p,
                top_k: CONSULTATION_SETTINGS.top_k,
                num_predict: CONSULTATION_SETTINGS.max_output_tokens,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2048);
        assert_eq!(json["options"]["top_k"], 40);
    }

    #[test]
    fn unreachable_server_is_a_connection_error() {
        // Port 9 (discard) is closed on test machines.
        let client = OllamaClient::new("http://127.0.0.1:9", "m").unwrap();
        let err = client
            .generate("prompt", "system", &CONSULTATION_SETTINGS)
            .unwrap_err();
        assert_eq!(err, ReasoningError::Connection("http://127.0.0.1:9".into()));
    }
}
