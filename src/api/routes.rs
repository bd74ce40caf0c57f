//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{generate, health, metrics, AppState};

/// Create the API router.
///
/// Endpoints are served both at the root and under `/api`.
pub fn create_router(state: AppState) -> Router {
    let endpoints = Router::new()
        .route("/generate", post(generate))
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    Router::new()
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
