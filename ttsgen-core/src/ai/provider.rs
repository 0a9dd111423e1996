use crate::ai::error::AiError;

/// A generative language model that turns a prompt into prose.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the generated text untrimmed; callers decide how to clean it.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError>;
}
