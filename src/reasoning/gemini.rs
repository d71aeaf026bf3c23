use serde::{Deserialize, Serialize};

use super::{
    http_client, map_transport_error, read_json, GenerationSettings, ReasoningClient,
    ReasoningError,
};

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
    ) -> Result<Self, ReasoningError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client: http_client()?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationSettings> for GenerationConfig {
    fn from(s: &GenerationSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_p: s.top_p,
            top_k: s.top_k,
            max_output_tokens: s.max_output_tokens,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Join the text parts of the first candidate, one part per line.
fn extract_text(response: GenerateContentResponse) -> Result<String, ReasoningError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ReasoningError::Blocked(reason));
    }

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ReasoningError::EmptyResponse);
    }
    Ok(text)
}

impl ReasoningClient for GeminiClient {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        settings: &GenerationSettings,
    ) -> Result<String, ReasoningError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ReasoningError::MissingCredentials)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            generation_config: settings.into(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        let parsed: GenerateContentResponse = read_json(response)?;
        extract_text(parsed)
    }

    fn backend(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::CONSULTATION_SETTINGS;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_uses_camel_case_config() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hello" }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            generation_config: (&CONSULTATION_SETTINGS).into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn joins_all_parts_of_first_candidate() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"POSSIBLE CONDITIONS:"},{"text":"Migraine"}]}},
                              {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "POSSIBLE CONDITIONS:\nMigraine");
    }

    #[test]
    fn no_candidates_is_empty_response() {
        assert_eq!(
            extract_text(parse(r#"{"candidates":[]}"#)).unwrap_err(),
            ReasoningError::EmptyResponse
        );
        assert_eq!(
            extract_text(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)).unwrap_err(),
            ReasoningError::EmptyResponse
        );
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(
            extract_text(response).unwrap_err(),
            ReasoningError::Blocked("SAFETY".into())
        );
    }

    #[test]
    fn missing_key_fails_without_network() {
        let client = GeminiClient::new("http://127.0.0.1:9", "gemini-2.0-flash", None).unwrap();
        let err = client
            .generate("prompt", "system", &CONSULTATION_SETTINGS)
            .unwrap_err();
        assert_eq!(err, ReasoningError::MissingCredentials);
    }

    #[test]
    fn endpoint_includes_model_and_trims_slash() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-2.0-flash",
            Some("k".into()),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
