//! Gemini text-to-speech implementation

use anyhow::anyhow;
use async_trait::async_trait;

use super::provider::SpeechSynthesizer;
use super::types::{AudioPart, AudioPayload, SpeechResponse};
use crate::ai::error::AiError;
use crate::ai::gemini::{GeminiClient, GeminiConfig, GenerateContentRequest};

pub struct GeminiSpeechSynthesizer {
    client: GeminiClient,
}

impl GeminiSpeechSynthesizer {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeechSynthesizer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn synthesize(
        &self,
        model: &str,
        prompt: &str,
        voice: &str,
    ) -> Result<SpeechResponse, AiError> {
        let request = GenerateContentRequest::speech(prompt, voice);
        let response = self.client.generate_content(model, &request).await?;

        let parts: Vec<AudioPart> = response
            .inline_data()?
            .into_iter()
            .map(|inline| AudioPart {
                mime_type: inline.mime_type.clone(),
                payload: AudioPayload::Base64(inline.data.clone()),
            })
            .collect();

        if parts.is_empty() {
            return Err(AiError::Retryable(anyhow!(
                "Gemini speech response contained no audio"
            )));
        }

        Ok(SpeechResponse { parts })
    }
}
