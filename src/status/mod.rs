//! Health verdict and metrics snapshot derived from runtime samples.

pub mod health;
pub mod snapshot;

pub use health::{HealthChecks, HealthReport, HealthState, HealthStatus, MemoryCheck};
pub use snapshot::{MetricsReport, MetricsSnapshot};
