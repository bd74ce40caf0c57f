//! Gemini REST client.
//!
//! Calls `models/{model}:generateContent` and returns the concatenated text
//! of the first candidate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::metrics;

use super::{ProviderError, TextGenerator};

/// Gemini text generation client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// REST API base URL.
    api_base: String,
    /// API key; `None` when the credential is not configured.
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether a credential is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!("Sending request to Gemini API");
        let start = Instant::now();

        let response = self
            .http
            .post(self.generate_url(model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await;

        metrics::record_upstream_latency(start);
        let response = response?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini API returned an error");

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(body)
    }
}

/// Pull the text out of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        debug!(reason, "Prompt blocked");
        return Err(ProviderError::ContentFiltered);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(ProviderError::ContentFiltered);
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    Ok(text)
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn client_creation_works() {
        let config = Config {
            gemini_api_base: "https://example.com/v1beta/".to_string(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.api_base(), "https://example.com/v1beta");
        assert!(!client.is_configured());
        assert_eq!(
            client.generate_url("gemini-2.0-flash"),
            "https://example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn empty_key_counts_as_unconfigured() {
        let config = Config {
            gemini_api_key: Some(String::new()),
            ..Config::default()
        };
        assert!(!GeminiClient::new(&config).unwrap().is_configured());
    }

    #[tokio::test]
    async fn generate_without_key_fails_before_network() {
        let client = GeminiClient::new(&Config::default()).unwrap();
        let err = client.generate("hello", "gemini-2.0-flash").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn extract_text_joins_parts_of_first_candidate() {
        let body = parse(
            r#"{"candidates":[
                {"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world"}]},"finishReason":"STOP"},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"#,
        );
        assert_eq!(extract_text(body).unwrap(), "Hello, world");
    }

    #[test]
    fn extract_text_rejects_missing_candidates() {
        let body = parse(r#"{"candidates":[]}"#);
        assert!(matches!(extract_text(body), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn extract_text_reports_safety_blocks() {
        let blocked_prompt = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert!(matches!(
            extract_text(blocked_prompt),
            Err(ProviderError::ContentFiltered)
        ));

        let blocked_output = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            extract_text(blocked_output),
            Err(ProviderError::ContentFiltered)
        ));
    }

    #[test]
    fn request_serializes_in_gemini_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some("hi".to_string()),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents":[{"role":"user","parts":[{"text":"hi"}]}]})
        );
    }
}
