//! HTTP gateway in front of Gemini text generation.
//!
//! Three endpoints, no shared mutable state:
//!
//! ```text
//! POST /generate  { prompt, model? }  -> 200 { text, model } | 400 { error } | 500 { error }
//! GET  /health                        -> 200 healthy | 503 unhealthy
//! GET  /metrics                       -> 200 runtime snapshot | 500 { error, timestamp }
//! ```
//!
//! The service is unhealthy when `GEMINI_API_KEY` is missing or heap usage
//! exceeds 90%.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`generation`]: Request validation and provider dispatch
//! - [`provider`]: Text generation trait, Gemini client, mock
//! - [`runtime`]: Process memory/CPU sampling
//! - [`status`]: Health verdict and metrics snapshot
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus counters
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod metrics;
pub mod provider;
pub mod runtime;
pub mod status;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
