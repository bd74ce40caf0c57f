//! HTTP API handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};

use crate::config::Config;
use crate::generation::{self, GenerationRequest, GenerationResult};
use crate::provider::TextGenerator;
use crate::runtime::RuntimeSampler;
use crate::status::snapshot::MetricsFailure;
use crate::status::{health, snapshot, HealthStatus, MetricsSnapshot};

/// Application state shared with handlers. Everything in it is immutable.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<Config>,
    /// Text generation provider.
    pub generator: Arc<dyn TextGenerator>,
    /// Runtime counters source.
    pub sampler: Arc<dyn RuntimeSampler>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        sampler: Arc<dyn RuntimeSampler>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generator,
            sampler,
        }
    }
}

/// Generate handler - 200 with text, 400 on invalid input, 500 on provider failure.
///
/// The body is taken raw so malformed JSON gets the same `{ "error" }` shape
/// as any other rejection.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generation",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated text", body = GenerationResult),
        (status = 400, description = "Missing or empty prompt", body = GenerationResult),
        (status = 500, description = "Provider failure", body = GenerationResult)
    )
)]
pub async fn generate(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let (status, result) =
        generation::handle(state.generator.as_ref(), &body, &state.config.gemini_model).await;
    (status, Json(result))
}

/// Health handler - 200 if healthy, 503 otherwise.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service healthy", body = HealthStatus),
        (status = 503, description = "Service unhealthy or sampling failed", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (status, report) = health::handle(&state.config, state.sampler.as_ref());
    (status, Json(report))
}

/// Metrics handler - runtime snapshot, 500 only if sampling fails.
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "system",
    responses(
        (status = 200, description = "Runtime snapshot", body = MetricsSnapshot),
        (status = 500, description = "Sampling failed", body = MetricsFailure)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (status, report) = snapshot::handle(&state.config, state.sampler.as_ref());
    (status, Json(report))
}
