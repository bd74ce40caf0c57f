//! Runtime introspection: memory, CPU time, and process identity.
//!
//! Handlers only see [`RuntimeSampler`]. The live implementation reads
//! `/proc/self` ([`ProcSampler`]); tests use [`FixedSampler`].

pub mod fixed;
pub mod live;

use std::time::Duration;

pub use crate::error::SamplingError;
pub use fixed::FixedSampler;
pub use live::ProcSampler;

/// Point-in-time memory counters, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemorySample {
    /// Resident set size.
    pub rss_bytes: u64,
    /// Memory reserved for the heap.
    pub heap_total_bytes: u64,
    /// Heap memory actually in use.
    pub heap_used_bytes: u64,
    /// Resident memory backed by files (mapped binaries, libraries).
    pub external_bytes: u64,
    /// Resident shared memory.
    pub array_buffers_bytes: u64,
}

/// Cumulative CPU time consumed by the process, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuSample {
    pub user_micros: u64,
    pub system_micros: u64,
}

/// Process identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub platform: String,
    pub runtime_version: String,
}

impl ProcessInfo {
    /// Identity of the running process.
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            platform: std::env::consts::OS.to_string(),
            runtime_version: runtime_version(),
        }
    }
}

/// Source of runtime counters.
pub trait RuntimeSampler: Send + Sync {
    /// Sample memory counters.
    fn memory(&self) -> Result<MemorySample, SamplingError>;

    /// Sample cumulative CPU time.
    fn cpu(&self) -> Result<CpuSample, SamplingError>;

    /// Time since the sampler (and so the service) started.
    fn uptime(&self) -> Duration;

    /// Process identity.
    fn process(&self) -> ProcessInfo {
        ProcessInfo::current()
    }
}

/// Toolchain label, e.g. `rust-1.75`.
pub fn runtime_version() -> String {
    let msrv = env!("CARGO_PKG_RUST_VERSION");
    if msrv.is_empty() {
        "rust".to_string()
    } else {
        format!("rust-{}", msrv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_info_matches_std() {
        let info = ProcessInfo::current();
        assert_eq!(info.pid, std::process::id());
        assert_eq!(info.platform, std::env::consts::OS);
        assert!(info.runtime_version.starts_with("rust"));
    }
}
