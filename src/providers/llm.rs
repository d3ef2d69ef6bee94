//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM text generation
///
/// The generator calls this several times per query for self-consistency
/// sampling; implementations must be safe to call concurrently.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
