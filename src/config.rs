//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Model used when a generation request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Gemini Credentials ===
    /// Gemini API key. Presence is all the health check looks at.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini REST API base URL.
    #[serde(default = "default_api_base")]
    pub gemini_api_base: String,

    /// Model used when a request omits `model`.
    #[serde(default = "default_model")]
    pub gemini_model: String,

    /// Timeout for a single upstream generation call.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Deployment Labels ===
    /// Deployment environment label (development, staging, production...).
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Version label reported by the health endpoint.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve a Prometheus scrape endpoint alongside the API.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Port for the Prometheus exporter.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_api_base: default_api_base(),
            gemini_model: default_model(),
            http_timeout_ms: default_http_timeout_ms(),
            app_env: default_app_env(),
            app_version: default_app_version(),
            port: default_port(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    ///
    /// A missing API key is not an error here: the service still starts and
    /// reports itself unhealthy.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be non-zero".to_string());
        }

        if self.gemini_model.trim().is_empty() {
            return Err("GEMINI_MODEL must not be empty".to_string());
        }

        if !crate::generation::is_valid_model_name(&self.gemini_model) {
            return Err("GEMINI_MODEL may only contain letters, digits, '.', '_' and '-'".to_string());
        }

        if !self.gemini_api_base.starts_with("http://")
            && !self.gemini_api_base.starts_with("https://")
        {
            return Err("GEMINI_API_BASE must be an http(s) URL".to_string());
        }

        if self.metrics_enabled && self.metrics_port == self.port {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    /// Whether the Gemini credential is present.
    pub fn api_configured(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }
}
