use async_trait::async_trait;

use crate::core::errors::ApiError;

#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// embed a single text and return its vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// return the provider name (e.g. "gemini")
    fn name(&self) -> &str;

    /// complete a prompt (non-streaming)
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}
