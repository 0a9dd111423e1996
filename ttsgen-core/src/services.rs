//! Construction of external service clients for a given credential.
//!
//! The pipeline rebuilds its clients through a [`ServiceFactory`] every
//! time the credential rotator moves, so no client ever outlives the key
//! it was created with.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ai::error::AiError;
use crate::ai::gemini::{GeminiConfig, GeminiTextGenerator};
use crate::ai::mock::MockTextGenerator;
use crate::ai::provider::TextGenerator;
use crate::settings::Settings;
use crate::voice::tts::gemini::GeminiSpeechSynthesizer;
use crate::voice::tts::mock::MockSpeechSynthesizer;
use crate::voice::tts::provider::SpeechSynthesizer;

pub trait ServiceFactory: Send + Sync {
    fn text_generator(&self, credential: &str) -> Result<Box<dyn TextGenerator>, AiError>;

    fn speech_synthesizer(&self, credential: &str)
        -> Result<Box<dyn SpeechSynthesizer>, AiError>;
}

#[derive(Debug, Clone)]
pub struct GeminiServiceFactory {
    base_url: String,
    timeout: Duration,
}

impl GeminiServiceFactory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url.clone(), settings.request_timeout())
    }

    fn config(&self, credential: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: credential.to_string(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }
}

impl ServiceFactory for GeminiServiceFactory {
    fn text_generator(&self, credential: &str) -> Result<Box<dyn TextGenerator>, AiError> {
        Ok(Box::new(GeminiTextGenerator::new(self.config(credential))?))
    }

    fn speech_synthesizer(
        &self,
        credential: &str,
    ) -> Result<Box<dyn SpeechSynthesizer>, AiError> {
        Ok(Box::new(GeminiSpeechSynthesizer::new(
            self.config(credential),
        )?))
    }
}

/// Hands out clones of shared mocks and records which credentials were used
#[derive(Clone)]
pub struct MockServiceFactory {
    text: MockTextGenerator,
    speech: MockSpeechSynthesizer,
    issued_credentials: Arc<Mutex<Vec<String>>>,
}

impl MockServiceFactory {
    pub fn new(text: MockTextGenerator, speech: MockSpeechSynthesizer) -> Self {
        Self {
            text,
            speech,
            issued_credentials: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Credential used for each text client built, in order
    pub fn get_issued_credentials(&self) -> Vec<String> {
        self.issued_credentials.lock().unwrap().clone()
    }
}

impl ServiceFactory for MockServiceFactory {
    fn text_generator(&self, credential: &str) -> Result<Box<dyn TextGenerator>, AiError> {
        self.issued_credentials
            .lock()
            .unwrap()
            .push(credential.to_string());
        Ok(Box::new(self.text.clone()))
    }

    fn speech_synthesizer(
        &self,
        _credential: &str,
    ) -> Result<Box<dyn SpeechSynthesizer>, AiError> {
        Ok(Box::new(self.speech.clone()))
    }
}
