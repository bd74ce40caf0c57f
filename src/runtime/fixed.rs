//! Sampler returning canned values, for tests and demos.

use std::time::Duration;

use super::{CpuSample, MemorySample, ProcessInfo, RuntimeSampler, SamplingError};

/// Sampler with fixed readings. `None` makes that reading fail.
#[derive(Debug, Clone)]
pub struct FixedSampler {
    pub memory: Option<MemorySample>,
    pub cpu: Option<CpuSample>,
    pub uptime: Duration,
    pub process: ProcessInfo,
}

impl FixedSampler {
    /// Heap at `percent`% of a 100 MB heap; everything else small and valid.
    pub fn with_heap_percent(percent: u64) -> Self {
        let total = 100 * crate::utils::BYTES_PER_MB;
        Self {
            memory: Some(MemorySample {
                rss_bytes: 150 * crate::utils::BYTES_PER_MB,
                heap_total_bytes: total,
                heap_used_bytes: total / 100 * percent,
                external_bytes: 3 * crate::utils::BYTES_PER_MB,
                array_buffers_bytes: crate::utils::BYTES_PER_MB / 4,
            }),
            cpu: Some(CpuSample {
                user_micros: 1_234_500,
                system_micros: 99_400,
            }),
            uptime: Duration::from_millis(42_500),
            process: ProcessInfo::current(),
        }
    }

    /// Sampler whose every reading fails.
    pub fn failing() -> Self {
        Self {
            memory: None,
            cpu: None,
            ..Self::with_heap_percent(0)
        }
    }
}

impl RuntimeSampler for FixedSampler {
    fn memory(&self) -> Result<MemorySample, SamplingError> {
        self.memory
            .ok_or(SamplingError::Unavailable("memory"))
    }

    fn cpu(&self) -> Result<CpuSample, SamplingError> {
        self.cpu.ok_or(SamplingError::Unavailable("cpu"))
    }

    fn uptime(&self) -> Duration {
        self.uptime
    }

    fn process(&self) -> ProcessInfo {
        self.process.clone()
    }
}
