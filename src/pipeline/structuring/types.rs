use async_trait::async_trait;

use super::StructuringError;

/// Sampling temperature for report structuring (deterministic request).
pub const STRUCTURING_TEMPERATURE: f32 = 0.0;

/// Chat-completion client abstraction (allows mocking)
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single user message and return the first choice's content,
    /// or an empty string when the choice carries no content.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, StructuringError>;
}
