//! OpenAPI document.

use utoipa::OpenApi;

use crate::generation::{GenerationRequest, GenerationResult};
use crate::status::health::{HealthChecks, HealthFailure, HealthState, MemoryCheck};
use crate::status::snapshot::{CpuMetrics, MemoryMetrics, MetricsFailure, ProcessMetrics};
use crate::status::{HealthStatus, MetricsSnapshot};

#[derive(OpenApi)]
#[openapi(
    paths(super::handlers::generate, super::handlers::health, super::handlers::metrics),
    components(schemas(
        GenerationRequest,
        GenerationResult,
        HealthStatus,
        HealthState,
        HealthChecks,
        HealthFailure,
        MemoryCheck,
        MetricsSnapshot,
        MemoryMetrics,
        CpuMetrics,
        ProcessMetrics,
        MetricsFailure
    )),
    tags(
        (name = "generation", description = "Text generation proxy"),
        (name = "system", description = "Health and runtime metrics")
    )
)]
pub struct ApiDoc;
