//! # netrag completion
//!
//! The text-generation side of RAG. A [`CompletionService`] takes a fully
//! composed prompt and returns text; [`OllamaClient`] talks to a local Ollama
//! server. When generation is impossible callers answer with
//! [`fallback_response`] instead of an error.

mod error;
mod fallback;
mod ollama;

pub use error::{CompletionError, Result};
pub use fallback::fallback_response;
pub use ollama::{OllamaClient, OllamaConfig, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

use async_trait::async_trait;

/// Opaque prompt-in, text-out generator
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// True when the backend answers a cheap probe
    async fn is_available(&self) -> bool;

    /// Model names the backend can serve; empty when unknown or unreachable
    async fn available_models(&self) -> Vec<String>;

    /// Model used for `complete`
    fn model(&self) -> &str;
}
