//! Gemini (Generative Language API) text generation.
//!
//! The wire types here are shared with the Gemini speech synthesizer, which
//! talks to the same `:generateContent` endpoint with audio output enabled.

use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::error::{has_quota_marker, AiError};
use crate::ai::provider::TextGenerator;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &crate::credentials::mask_credential(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Thin HTTP client for `models/{model}:generateContent`.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Terminal(anyhow!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, model, "Gemini API call failed");
                AiError::Retryable(anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Retryable(anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, model, "Gemini API returned error");
            return Err(classify_http_failure(status.as_u16(), &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            AiError::Retryable(anyhow!(
                "Failed to parse Gemini response: {} - Response: {}",
                e,
                response_text
            ))
        })
    }
}

/// Map a non-success HTTP status and body to the error taxonomy.
pub fn classify_http_failure(status: u16, body: &str) -> AiError {
    let err = anyhow!("Gemini API error {}: {}", status, body);
    if status == 429 || has_quota_marker(body) {
        AiError::QuotaExceeded(err)
    } else if status == 408 || status >= 500 {
        AiError::Retryable(err)
    } else {
        AiError::Terminal(err)
    }
}

pub struct GeminiTextGenerator {
    client: GeminiClient,
}

impl GeminiTextGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiTextGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        let request = GenerateContentRequest::text(prompt);
        let response = self.client.generate_content(model, &request).await?;
        response.text()
    }
}

// Generative Language API types

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn text(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: None,
        }
    }

    pub fn speech(prompt: &str, voice_name: &str) -> Self {
        Self {
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                }),
            }),
            ..Self::text(prompt)
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub(crate) struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize, Clone)]
pub(crate) struct RequestPart {
    pub text: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: Option<String>,
    pub data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> Result<&[ResponsePart], AiError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| AiError::Retryable(anyhow!("No candidates in response")))?;
        Ok(candidate
            .content
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default())
    }

    /// Concatenated text of the first candidate. An empty string is a valid
    /// answer; only a response without candidates is an error.
    pub fn text(&self) -> Result<String, AiError> {
        Ok(self
            .first_parts()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join(""))
    }

    pub fn inline_data(&self) -> Result<Vec<&InlineData>, AiError> {
        Ok(self
            .first_parts()?
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .collect())
    }
}
