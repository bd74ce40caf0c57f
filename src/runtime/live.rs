//! Live sampler backed by `/proc/self`.
//!
//! Mapping from kernel counters:
//!
//! ```text
//! rss           <- VmRSS
//! heap total    <- VmData    (private data segment, reserved)
//! heap used     <- RssAnon   (resident anonymous pages)
//! external      <- RssFile
//! array buffers <- RssShmem
//! cpu user/sys  <- utime/stime clock ticks
//! uptime        <- /proc/uptime minus starttime
//! ```
//!
//! On platforms without procfs every sample fails with
//! [`SamplingError::Unsupported`].

use std::time::{Duration, Instant};

use super::{CpuSample, MemorySample, RuntimeSampler, SamplingError};

/// Sampler reading the current process's procfs entries.
#[derive(Debug, Clone)]
pub struct ProcSampler {
    /// Fallback origin for uptime when procfs cannot be read.
    started_at: Instant,
}

impl ProcSampler {
    /// Create a sampler. Uptime is that of the process, not of the sampler.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for ProcSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeSampler for ProcSampler {
    fn memory(&self) -> Result<MemorySample, SamplingError> {
        read_memory()
    }

    fn cpu(&self) -> Result<CpuSample, SamplingError> {
        read_cpu()
    }

    fn uptime(&self) -> Duration {
        read_process_uptime().unwrap_or_else(|_| self.started_at.elapsed())
    }
}

#[cfg(target_os = "linux")]
fn read_memory() -> Result<MemorySample, SamplingError> {
    use procfs::process::Process;

    let status = Process::myself()?.status()?;

    let kb = |value: Option<u64>, name: &'static str| {
        value
            .map(|kb| kb.saturating_mul(1024))
            .ok_or(SamplingError::Unavailable(name))
    };

    Ok(MemorySample {
        rss_bytes: kb(status.vmrss, "VmRSS")?,
        heap_total_bytes: kb(status.vmdata, "VmData")?,
        heap_used_bytes: kb(status.rssanon, "RssAnon")?,
        // Older kernels omit these two.
        external_bytes: status.rssfile.unwrap_or(0).saturating_mul(1024),
        array_buffers_bytes: status.rssshmem.unwrap_or(0).saturating_mul(1024),
    })
}

#[cfg(target_os = "linux")]
fn read_cpu() -> Result<CpuSample, SamplingError> {
    use procfs::process::Process;

    let stat = Process::myself()?.stat()?;
    let ticks_per_second = procfs::ticks_per_second();
    if ticks_per_second == 0 {
        return Err(SamplingError::Invalid("clock ticks per second is zero".to_string()));
    }

    let to_micros = |ticks: u64| ticks.saturating_mul(1_000_000) / ticks_per_second;

    Ok(CpuSample {
        user_micros: to_micros(stat.utime),
        system_micros: to_micros(stat.stime),
    })
}

/// Seconds since boot minus the process start time (in ticks since boot).
#[cfg(target_os = "linux")]
fn read_process_uptime() -> Result<Duration, SamplingError> {
    use procfs::process::Process;
    use procfs::{Current, Uptime};

    let starttime = Process::myself()?.stat()?.starttime;
    let ticks_per_second = procfs::ticks_per_second();
    if ticks_per_second == 0 {
        return Err(SamplingError::Invalid("clock ticks per second is zero".to_string()));
    }

    let system_uptime = Uptime::current()?.uptime;
    let started = starttime as f64 / ticks_per_second as f64;
    Ok(Duration::from_secs_f64((system_uptime - started).max(0.0)))
}

#[cfg(not(target_os = "linux"))]
fn read_process_uptime() -> Result<Duration, SamplingError> {
    Err(SamplingError::Unsupported(std::env::consts::OS))
}

#[cfg(not(target_os = "linux"))]
fn read_memory() -> Result<MemorySample, SamplingError> {
    Err(SamplingError::Unsupported(std::env::consts::OS))
}

#[cfg(not(target_os = "linux"))]
fn read_cpu() -> Result<CpuSample, SamplingError> {
    Err(SamplingError::Unsupported(std::env::consts::OS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_does_not_go_backwards() {
        let sampler = ProcSampler::new();
        let first = sampler.uptime();
        std::thread::sleep(Duration::from_millis(30));
        assert!(sampler.uptime() >= first);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn uptime_counts_from_process_start() {
        let process_uptime = read_process_uptime().unwrap();

        // A sampler created later still reports the whole process lifetime.
        std::thread::sleep(Duration::from_millis(50));
        let sampler = ProcSampler::new();
        assert!(sampler.uptime() >= process_uptime);
        assert!(sampler.uptime() >= Duration::from_millis(50));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn reads_live_counters() {
        let sampler = ProcSampler::new();
        let memory = sampler.memory().unwrap();
        assert!(memory.rss_bytes > 0);
        assert!(memory.heap_total_bytes > 0);

        assert!(sampler.cpu().is_ok());
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn unsupported_platform_reports_error() {
        let sampler = ProcSampler::new();
        assert!(matches!(sampler.memory(), Err(SamplingError::Unsupported(_))));
    }
}
