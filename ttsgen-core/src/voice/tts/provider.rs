use async_trait::async_trait;

use super::types::SpeechResponse;
use crate::ai::error::AiError;

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Synthesize `prompt` with the given prebuilt voice.
    ///
    /// The prompt carries both the delivery description and the words to
    /// speak; providers steer style from the description.
    async fn synthesize(
        &self,
        model: &str,
        prompt: &str,
        voice: &str,
    ) -> Result<SpeechResponse, AiError>;
}
