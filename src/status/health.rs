//! Health verdict.
//!
//! The service is unhealthy when the Gemini credential is missing or heap
//! usage is above [`MEMORY_UNHEALTHY_PERCENT`]. The HTTP status always
//! mirrors the `status` field.

use axum::http::StatusCode;
use serde::Serialize;
use strum::Display;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::SamplingError;
use crate::metrics;
use crate::runtime::{MemorySample, RuntimeSampler};
use crate::utils::{bytes_to_mb, iso_timestamp};

/// Heap usage above this percentage marks the service unhealthy.
pub const MEMORY_UNHEALTHY_PERCENT: u8 = 90;

/// Binary health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl HealthState {
    /// 200 for healthy, 503 otherwise.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Healthy => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Heap usage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemoryCheck {
    /// Heap in use, MB.
    #[serde(rename = "usedMB")]
    pub used_mb: u64,
    /// Heap reserved, MB.
    #[serde(rename = "totalMB")]
    pub total_mb: u64,
    /// `round(used / total * 100)`, in `0..=100`.
    pub percentage: u8,
}

impl MemoryCheck {
    /// Derive the check from raw byte counters.
    pub fn from_sample(sample: &MemorySample) -> Result<Self, SamplingError> {
        Ok(Self {
            used_mb: bytes_to_mb(sample.heap_used_bytes),
            total_mb: bytes_to_mb(sample.heap_total_bytes),
            percentage: memory_percentage(sample.heap_used_bytes, sample.heap_total_bytes)?,
        })
    }
}

/// Individual checks feeding the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    /// Whether the Gemini credential is present.
    pub api_configured: bool,
    pub memory: MemoryCheck,
}

impl HealthChecks {
    /// Unhealthy iff the credential is missing or memory is above threshold.
    pub fn verdict(&self) -> HealthState {
        if !self.api_configured || self.memory.percentage > MEMORY_UNHEALTHY_PERCENT {
            HealthState::Unhealthy
        } else {
            HealthState::Healthy
        }
    }
}

/// Health endpoint payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    status: HealthState,
    pub timestamp: String,
    pub uptime_seconds: f64,
    pub environment: String,
    pub version: String,
    pub checks: HealthChecks,
}

impl HealthStatus {
    /// Build a status; the verdict is always derived from `checks`.
    pub fn new(checks: HealthChecks, uptime_seconds: f64, environment: String, version: String) -> Self {
        Self {
            status: checks.verdict(),
            timestamp: iso_timestamp(),
            uptime_seconds,
            environment,
            version,
            checks,
        }
    }

    pub fn status(&self) -> HealthState {
        self.status
    }
}

/// Payload when sampling itself failed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthFailure {
    /// Always `unhealthy`.
    pub status: HealthState,
    pub timestamp: String,
    pub error: String,
}

/// Either a full status or a sampling failure.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HealthReport {
    Status(HealthStatus),
    Failed(HealthFailure),
}

impl HealthReport {
    /// Verdict carried by the report.
    pub fn state(&self) -> HealthState {
        match self {
            Self::Status(status) => status.status(),
            Self::Failed(failure) => failure.status,
        }
    }
}

/// `round(used / total * 100)` clamped into `0..=100`.
///
/// A zero total is reported as an invalid sample rather than a division by zero.
pub fn memory_percentage(used: u64, total: u64) -> Result<u8, SamplingError> {
    if total == 0 {
        return Err(SamplingError::Invalid("heap total is zero".to_string()));
    }

    let percent = (used as f64 / total as f64 * 100.0).round();
    Ok(percent.clamp(0.0, 100.0) as u8)
}

/// Sample the runtime and evaluate health.
pub fn check(config: &Config, sampler: &dyn RuntimeSampler) -> Result<HealthStatus, SamplingError> {
    let memory = MemoryCheck::from_sample(&sampler.memory()?)?;
    let checks = HealthChecks {
        api_configured: config.api_configured(),
        memory,
    };

    Ok(HealthStatus::new(
        checks,
        sampler.uptime().as_secs_f64(),
        config.app_env.clone(),
        config.app_version.clone(),
    ))
}

/// Run the health check and pick the HTTP status. Never fails.
pub fn handle(config: &Config, sampler: &dyn RuntimeSampler) -> (StatusCode, HealthReport) {
    let report = match check(config, sampler) {
        Ok(status) => {
            if status.status() == HealthState::Unhealthy {
                warn!(
                    api_configured = status.checks.api_configured,
                    memory_percentage = status.checks.memory.percentage,
                    "Health check unhealthy"
                );
            }
            HealthReport::Status(status)
        }
        Err(e) => {
            error!(error = %e, "Health check failed");
            HealthReport::Failed(HealthFailure {
                status: HealthState::Unhealthy,
                timestamp: iso_timestamp(),
                error: e.to_string(),
            })
        }
    };

    let state = report.state();
    metrics::inc_health_checks(state);
    (state.http_status(), report)
}
