//! Small helpers shared across the crate.

use chrono::{SecondsFormat, Utc};
use tracing::info;

/// Bytes per megabyte (binary).
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Microseconds per millisecond.
pub const MICROS_PER_MS: u64 = 1000;

/// Current UTC time as ISO-8601 with millisecond precision (`2024-01-01T00:00:00.000Z`).
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Integer division rounding half away from zero.
///
/// Operands are unsigned, so this is round-half-up.
pub fn div_round(value: u64, divisor: u64) -> u64 {
    debug_assert!(divisor > 0);
    value.saturating_add(divisor / 2) / divisor
}

/// Convert bytes to whole megabytes.
pub fn bytes_to_mb(bytes: u64) -> u64 {
    div_round(bytes, BYTES_PER_MB)
}

/// Convert microseconds to whole milliseconds.
pub fn micros_to_ms(micros: u64) -> u64 {
    div_round(micros, MICROS_PER_MS)
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
