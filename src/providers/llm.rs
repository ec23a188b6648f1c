//! Chat completion provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-based text generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a fully-assembled prompt and return the model's text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model name, for logging
    fn model(&self) -> &str;

    /// Provider name, for logging
    fn name(&self) -> &str;
}
