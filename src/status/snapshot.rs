//! Metrics snapshot: normalized runtime counters, no verdict.

use std::time::Duration;

use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::SamplingError;
use crate::metrics;
use crate::runtime::{CpuSample, MemorySample, ProcessInfo, RuntimeSampler};
use crate::utils::{bytes_to_mb, iso_timestamp, micros_to_ms};

/// Memory counters in whole MB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemoryMetrics {
    #[serde(rename = "rssMB")]
    pub rss_mb: u64,
    #[serde(rename = "heapTotalMB")]
    pub heap_total_mb: u64,
    #[serde(rename = "heapUsedMB")]
    pub heap_used_mb: u64,
    #[serde(rename = "externalMB")]
    pub external_mb: u64,
    #[serde(rename = "arrayBuffersMB")]
    pub array_buffers_mb: u64,
}

impl From<MemorySample> for MemoryMetrics {
    fn from(sample: MemorySample) -> Self {
        Self {
            rss_mb: bytes_to_mb(sample.rss_bytes),
            heap_total_mb: bytes_to_mb(sample.heap_total_bytes),
            heap_used_mb: bytes_to_mb(sample.heap_used_bytes),
            external_mb: bytes_to_mb(sample.external_bytes),
            array_buffers_mb: bytes_to_mb(sample.array_buffers_bytes),
        }
    }
}

/// CPU time in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CpuMetrics {
    pub user_ms: u64,
    pub system_ms: u64,
}

impl From<CpuSample> for CpuMetrics {
    fn from(sample: CpuSample) -> Self {
        Self {
            user_ms: micros_to_ms(sample.user_micros),
            system_ms: micros_to_ms(sample.system_micros),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetrics {
    pub pid: u32,
    pub platform: String,
    pub runtime_version: String,
}

impl From<ProcessInfo> for ProcessMetrics {
    fn from(info: ProcessInfo) -> Self {
        Self {
            pid: info.pid,
            platform: info.platform,
            runtime_version: info.runtime_version,
        }
    }
}

/// Metrics endpoint payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: f64,
    pub memory: MemoryMetrics,
    pub cpu: CpuMetrics,
    pub process: ProcessMetrics,
    pub environment: String,
}

impl MetricsSnapshot {
    /// Normalize raw samples into a snapshot.
    pub fn from_samples(
        memory: MemorySample,
        cpu: CpuSample,
        process: ProcessInfo,
        uptime: Duration,
        environment: String,
    ) -> Self {
        Self {
            timestamp: iso_timestamp(),
            uptime_seconds: uptime.as_secs_f64(),
            memory: memory.into(),
            cpu: cpu.into(),
            process: process.into(),
            environment,
        }
    }
}

/// Payload when sampling failed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsFailure {
    pub error: String,
    pub timestamp: String,
}

/// Either a full snapshot or a failure.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricsReport {
    Snapshot(MetricsSnapshot),
    Failed(MetricsFailure),
}

/// Sample the runtime into a snapshot.
pub fn collect(config: &Config, sampler: &dyn RuntimeSampler) -> Result<MetricsSnapshot, SamplingError> {
    let memory = sampler.memory()?;
    let cpu = sampler.cpu()?;

    Ok(MetricsSnapshot::from_samples(
        memory,
        cpu,
        sampler.process(),
        sampler.uptime(),
        config.app_env.clone(),
    ))
}

/// Collect a snapshot and pick the HTTP status. Never fails.
pub fn handle(config: &Config, sampler: &dyn RuntimeSampler) -> (StatusCode, MetricsReport) {
    match collect(config, sampler) {
        Ok(snapshot) => (StatusCode::OK, MetricsReport::Snapshot(snapshot)),
        Err(e) => {
            error!(error = %e, "Metrics collection failed");
            metrics::inc_snapshot_failures();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MetricsReport::Failed(MetricsFailure {
                    error: "Failed to collect metrics".to_string(),
                    timestamp: iso_timestamp(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FixedSampler;
    use crate::utils::BYTES_PER_MB;
    use pretty_assertions::assert_eq;

    #[test]
    fn units_are_rounded_not_truncated() {
        let memory = MemorySample {
            rss_bytes: 10 * BYTES_PER_MB + BYTES_PER_MB / 2,
            heap_total_bytes: 10 * BYTES_PER_MB + BYTES_PER_MB / 2 - 1,
            heap_used_bytes: 0,
            external_bytes: BYTES_PER_MB - 1,
            array_buffers_bytes: 1,
        };
        assert_eq!(
            MemoryMetrics::from(memory),
            MemoryMetrics {
                rss_mb: 11,
                heap_total_mb: 10,
                heap_used_mb: 0,
                external_mb: 1,
                array_buffers_mb: 0,
            }
        );

        let cpu = CpuSample {
            user_micros: 2_500,
            system_micros: 2_499,
        };
        assert_eq!(CpuMetrics::from(cpu), CpuMetrics { user_ms: 3, system_ms: 2 });
    }

    #[test]
    fn snapshot_from_fixed_sampler() {
        let config = Config {
            app_env: "test".to_string(),
            ..Config::default()
        };
        let (code, report) = handle(&config, &FixedSampler::with_heap_percent(10));
        assert_eq!(code, StatusCode::OK);

        let MetricsReport::Snapshot(snapshot) = report else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.memory.rss_mb, 150);
        assert_eq!(snapshot.memory.heap_used_mb, 10);
        assert_eq!(snapshot.cpu, CpuMetrics { user_ms: 1_235, system_ms: 99 });
        assert_eq!(snapshot.process.pid, std::process::id());
        assert_eq!(snapshot.environment, "test");
    }

    #[test]
    fn failure_returns_no_partial_metrics() {
        let sampler = FixedSampler {
            cpu: None,
            ..FixedSampler::with_heap_percent(10)
        };
        let (code, report) = handle(&Config::default(), &sampler);
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "Failed to collect metrics");
        assert!(json["timestamp"].is_string());
        assert!(json.get("memory").is_none());
    }

    #[test]
    fn snapshot_serializes_documented_field_names() {
        let (_, report) = handle(&Config::default(), &FixedSampler::with_heap_percent(10));
        let json = serde_json::to_value(&report).unwrap();

        for key in ["rssMB", "heapTotalMB", "heapUsedMB", "externalMB", "arrayBuffersMB"] {
            assert!(json["memory"][key].is_u64(), "memory.{}", key);
        }
        assert!(json["cpu"]["userMs"].is_u64());
        assert!(json["cpu"]["systemMs"].is_u64());
        assert!(json["process"]["runtimeVersion"].is_string());
        assert!(json["uptimeSeconds"].is_number());
    }
}
