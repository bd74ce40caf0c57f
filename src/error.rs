//! Unified error types for the gateway.

use thiserror::Error;

/// Unified error type for the gateway process.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration present but invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Upstream provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Prometheus exporter failed to start.
    #[error("metrics exporter error: {0}")]
    MetricsExporter(#[from] metrics_exporter_prometheus::BuildError),
}

/// Inbound generation request rejected before reaching the provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body did not parse as a JSON object.
    #[error("request body must be a JSON object with a non-empty \"prompt\" field")]
    MalformedBody,

    /// A required field is absent or blank.
    #[error("\"{field}\" is required and must be a non-empty string")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An optional field has the wrong JSON type.
    #[error("\"{field}\" must be a string")]
    InvalidType {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field contains characters outside its allowed set.
    #[error("\"{field}\" may only contain letters, digits, '.', '_' and '-'")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Errors from the external text generation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Credential not configured.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Provider rejected the call (auth, bad request, server error).
    #[error("provider API error {status}: {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Body or reason returned by the provider.
        message: String,
    },

    /// Quota exhausted.
    #[error("provider rate limited")]
    RateLimited,

    /// Output blocked by the provider's safety filter.
    #[error("response blocked by content filter")]
    ContentFiltered,

    /// Provider answered without any text.
    #[error("provider returned no text")]
    EmptyResponse,

    /// Response body could not be decoded.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// Transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failures reading runtime counters.
#[derive(Error, Debug)]
pub enum SamplingError {
    /// Platform has no sampler.
    #[error("runtime sampling is not supported on {0}")]
    Unsupported(&'static str),

    /// A counter was missing from the sampled source.
    #[error("runtime counter unavailable: {0}")]
    Unavailable(&'static str),

    /// Sampled values were inconsistent.
    #[error("invalid runtime sample: {0}")]
    Invalid(String),

    /// Reading /proc failed.
    #[cfg(target_os = "linux")]
    #[error("procfs error: {0}")]
    Proc(#[from] procfs::ProcError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
