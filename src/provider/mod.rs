//! Text generation provider abstraction.
//!
//! The gateway only needs one capability from its upstream: turn a prompt
//! into text with a named model. Everything else about the provider
//! (transport, auth, payload shape) lives behind [`TextGenerator`].

pub mod gemini;
pub mod mock;

use async_trait::async_trait;

pub use crate::error::ProviderError;
pub use gemini::GeminiClient;
pub use mock::{MockBehavior, MockGenerator};

/// External text generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` using `model`.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError>;
}
