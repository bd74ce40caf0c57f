//! Mock text generator for unit testing.
//!
//! Records every call so tests can assert on what reached the provider
//! (or that nothing did).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ProviderError, TextGenerator};

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Echo the prompt back as `"<model>: <prompt>"`.
    Echo,
    /// Always answer with this text.
    Reply(String),
    /// Fail as if the credential were missing.
    NotConfigured,
    /// Fail with an upstream API error.
    ApiError(u16),
}

/// Mock generator for testing.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    /// Response behavior.
    behavior: MockBehavior,
    /// Recorded `(prompt, model)` pairs.
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockGenerator {
    /// Create a mock with the given behavior.
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Recorded `(prompt, model)` pairs, oldest first.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new(MockBehavior::Echo)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), model.to_string()));
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(format!("{}: {}", model, prompt)),
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::NotConfigured => Err(ProviderError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            )),
            MockBehavior::ApiError(status) => Err(ProviderError::Api {
                status: *status,
                message: "mock upstream failure".to_string(),
            }),
        }
    }
}
