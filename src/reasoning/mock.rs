//! Mock reasoning client for tests.

use std::sync::Mutex;

use super::{GenerationSettings, ReasoningClient, ReasoningError};

pub struct MockReasoningClient {
    outcome: Result<String, ReasoningError>,
    prompts: Mutex<Vec<String>>,
}

impl MockReasoningClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ReasoningError) -> Self {
        Self {
            outcome: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

impl ReasoningClient for MockReasoningClient {
    fn generate(
        &self,
        prompt: &str,
        _system: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, ReasoningError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.outcome.clone()
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}
