//! Prometheus metrics for request outcomes and upstream latency.
//!
//! These are operational counters scraped from the optional exporter; the
//! JSON `/metrics` endpoint is a separate runtime snapshot.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use strum::{Display, IntoStaticStr};
use tracing::{debug, info};

use crate::status::HealthState;

// === Metric Name Constants ===

/// Generation requests counter metric name.
pub const METRIC_GENERATE_REQUESTS: &str = "generate_requests_total";
/// Upstream generation latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_generate_latency_ms";
/// Health checks counter metric name.
pub const METRIC_HEALTH_CHECKS: &str = "health_checks_total";
/// Snapshot failures counter metric name.
pub const METRIC_SNAPSHOT_FAILURES: &str = "metrics_snapshot_failures_total";

/// Outcome label for generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// Failed validation (400).
    Rejected,
    /// Provider answered (200).
    Success,
    /// Provider failed (500).
    Failed,
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_GENERATE_REQUESTS,
        "Total generation requests by outcome"
    );
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Gemini generateContent latency in milliseconds"
    );
    describe_counter!(
        METRIC_HEALTH_CHECKS,
        "Total health checks by verdict"
    );
    describe_counter!(
        METRIC_SNAPSHOT_FAILURES,
        "Total metrics snapshots that failed to sample"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Increment generation requests counter.
pub fn inc_generate_requests(outcome: Outcome) {
    let label: &'static str = outcome.into();
    counter!(METRIC_GENERATE_REQUESTS, "outcome" => label).increment(1);
}

/// Record upstream generation latency.
pub fn record_upstream_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY).record(latency_ms);
}

/// Increment health checks counter.
pub fn inc_health_checks(state: HealthState) {
    counter!(METRIC_HEALTH_CHECKS, "status" => state.to_string()).increment(1);
}

/// Increment snapshot failures counter.
pub fn inc_snapshot_failures() {
    counter!(METRIC_SNAPSHOT_FAILURES).increment(1);
}
