//! Generation request validation and dispatch.
//!
//! A request body must be a JSON object whose `prompt` is a string with at
//! least one non-whitespace character. `model` is optional; absent or blank
//! falls back to the configured default. A model name is restricted to
//! `[A-Za-z0-9._-]` since it becomes a path segment of the upstream URL.
//! Invalid requests never reach the provider.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::error::{ProviderError, ValidationError};
use crate::metrics;
use crate::provider::TextGenerator;

/// Inbound generation request (documentation shape; parsing is done by [`validate`]).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerationRequest {
    /// Prompt text. Must contain a non-whitespace character.
    pub prompt: String,
    /// Model identifier. Defaults to the configured model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Prompt as sent by the caller (not trimmed).
    pub prompt: String,
    /// Model to use, default applied.
    pub model: String,
}

/// Response payload: exactly one of `text` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum GenerationResult {
    /// Provider produced text.
    Success {
        /// Generated text.
        text: String,
        /// Model that produced it.
        model: String,
    },
    /// Request rejected or provider failed.
    Failure {
        /// Human-readable error.
        #[serde(rename = "error")]
        error_message: String,
    },
}

impl GenerationResult {
    fn failure(error: impl ToString) -> Self {
        Self::Failure {
            error_message: error.to_string(),
        }
    }
}

/// Parse and validate a raw request body.
pub fn validate(body: &[u8], default_model: &str) -> Result<ValidatedRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    let fields = value.as_object().ok_or(ValidationError::MalformedBody)?;

    let prompt = match fields.get("prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => prompt.clone(),
        _ => return Err(ValidationError::MissingField { field: "prompt" }),
    };

    let model = match fields.get("model") {
        None | Some(Value::Null) => None,
        Some(Value::String(model)) => Some(model.trim()).filter(|m| !m.is_empty()),
        Some(_) => return Err(ValidationError::InvalidType { field: "model" }),
    };

    if let Some(model) = model {
        if !is_valid_model_name(model) {
            return Err(ValidationError::InvalidValue { field: "model" });
        }
    }

    Ok(ValidatedRequest {
        prompt,
        model: model.unwrap_or(default_model).to_string(),
    })
}

/// Whether `model` is safe to use as a single URL path segment.
pub fn is_valid_model_name(model: &str) -> bool {
    model
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Validate `body`, call the provider, and map the outcome to a status and payload.
///
/// Never fails: every error becomes a `Failure` payload.
pub async fn handle(
    generator: &dyn TextGenerator,
    body: &[u8],
    default_model: &str,
) -> (StatusCode, GenerationResult) {
    let request = match validate(body, default_model) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected generation request");
            metrics::inc_generate_requests(metrics::Outcome::Rejected);
            return (StatusCode::BAD_REQUEST, GenerationResult::failure(e));
        }
    };

    match generator.generate(&request.prompt, &request.model).await {
        Ok(text) => {
            info!(model = %request.model, text_len = text.len(), "Generation succeeded");
            metrics::inc_generate_requests(metrics::Outcome::Success);
            (
                StatusCode::OK,
                GenerationResult::Success {
                    text,
                    model: request.model,
                },
            )
        }
        Err(e) => {
            error!(model = %request.model, error = %e, "Generation failed");
            metrics::inc_generate_requests(metrics::Outcome::Failed);
            (StatusCode::INTERNAL_SERVER_ERROR, failure_payload(&e))
        }
    }
}

/// Upstream errors are reported with their message; bodies from the
/// provider are not echoed back to callers.
fn failure_payload(error: &ProviderError) -> GenerationResult {
    match error {
        ProviderError::Api { status, .. } => {
            GenerationResult::failure(format!("Generation failed: provider returned HTTP {}", status))
        }
        other => GenerationResult::failure(format!("Generation failed: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockBehavior, MockGenerator};
    use pretty_assertions::assert_eq;

    const DEFAULT: &str = "gemini-2.0-flash";

    #[test]
    fn validate_applies_default_model() {
        let request = validate(br#"{"prompt":"hello"}"#, DEFAULT).unwrap();
        assert_eq!(
            request,
            ValidatedRequest {
                prompt: "hello".to_string(),
                model: DEFAULT.to_string(),
            }
        );
    }

    #[test]
    fn validate_keeps_explicit_model() {
        let request = validate(br#"{"prompt":"hi","model":" gemini-pro "}"#, DEFAULT).unwrap();
        assert_eq!(request.model, "gemini-pro");

        let blank = validate(br#"{"prompt":"hi","model":"  "}"#, DEFAULT).unwrap();
        assert_eq!(blank.model, DEFAULT);

        let null = validate(br#"{"prompt":"hi","model":null}"#, DEFAULT).unwrap();
        assert_eq!(null.model, DEFAULT);
    }

    #[test]
    fn validate_rejects_missing_or_blank_prompt() {
        for body in [
            r#"{}"#,
            r#"{"prompt":""}"#,
            r#"{"prompt":"   \n\t"}"#,
            r#"{"prompt":null}"#,
            r#"{"prompt":42}"#,
            r#"{"model":"gemini-pro"}"#,
        ] {
            let err = validate(body.as_bytes(), DEFAULT).unwrap_err();
            assert_eq!(err, ValidationError::MissingField { field: "prompt" }, "body: {}", body);
        }
    }

    #[test]
    fn validate_rejects_non_object_bodies() {
        for body in ["", "not json", "[]", r#""prompt""#, "null"] {
            let err = validate(body.as_bytes(), DEFAULT).unwrap_err();
            assert_eq!(err, ValidationError::MalformedBody, "body: {:?}", body);
            assert!(err.to_string().contains("prompt"));
        }
    }

    #[test]
    fn validate_rejects_non_string_model() {
        let err = validate(br#"{"prompt":"hi","model":7}"#, DEFAULT).unwrap_err();
        assert_eq!(err, ValidationError::InvalidType { field: "model" });
    }

    #[test]
    fn validate_rejects_model_outside_name_charset() {
        for model in [
            "../../v1/tunedModels/x:delete?",
            "gemini-pro?key=x",
            "models/gemini-pro",
            "gemini pro",
            "gemini-pro#frag",
            "gemini:generateContent",
        ] {
            let body = serde_json::json!({ "prompt": "hi", "model": model }).to_string();
            let err = validate(body.as_bytes(), DEFAULT).unwrap_err();
            assert_eq!(err, ValidationError::InvalidValue { field: "model" }, "model: {}", model);
            assert!(err.to_string().contains("model"));
        }

        let ok = validate(br#"{"prompt":"hi","model":"gemini-1.5-pro_002"}"#, DEFAULT).unwrap();
        assert_eq!(ok.model, "gemini-1.5-pro_002");
    }

    #[tokio::test]
    async fn path_like_model_never_reaches_provider() {
        let mock = MockGenerator::default();
        let (status, result) = handle(
            &mock,
            br#"{"prompt":"hi","model":"../../v1/tunedModels/x:delete?"}"#,
            DEFAULT,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        match result {
            GenerationResult::Failure { error_message } => assert!(error_message.contains("model")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_provider() {
        let mock = MockGenerator::default();
        let (status, result) = handle(&mock, b"{}", DEFAULT).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        match result {
            GenerationResult::Failure { error_message } => assert!(error_message.contains("prompt")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn success_returns_text_and_model() {
        let mock = MockGenerator::new(MockBehavior::Reply("generated".to_string()));
        let (status, result) = handle(&mock, br#"{"prompt":"test"}"#, DEFAULT).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            result,
            GenerationResult::Success {
                text: "generated".to_string(),
                model: DEFAULT.to_string(),
            }
        );
        assert_eq!(mock.calls(), vec![("test".to_string(), DEFAULT.to_string())]);
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500() {
        let mock = MockGenerator::new(MockBehavior::NotConfigured);
        let (status, result) = handle(&mock, br#"{"prompt":"test"}"#, DEFAULT).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(result, GenerationResult::Failure { .. }));
    }

    #[tokio::test]
    async fn upstream_body_is_not_echoed() {
        let mock = MockGenerator::new(MockBehavior::ApiError(403));
        let (_, result) = handle(&mock, br#"{"prompt":"test"}"#, DEFAULT).await;

        assert_eq!(
            result,
            GenerationResult::Failure {
                error_message: "Generation failed: provider returned HTTP 403".to_string(),
            }
        );
    }

    #[test]
    fn result_serializes_exactly_one_field() {
        let ok = serde_json::to_value(GenerationResult::Success {
            text: "t".to_string(),
            model: "m".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"text": "t", "model": "m"}));

        let err = serde_json::to_value(GenerationResult::failure("boom")).unwrap();
        assert_eq!(err, serde_json::json!({"error": "boom"}));
    }
}
