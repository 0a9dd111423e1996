use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;

use super::provider::SpeechSynthesizer;
use super::types::{AudioPart, AudioPayload, SpeechResponse};
use crate::ai::error::AiError;
use crate::ai::mock::MockBehavior;

/// A synthesis call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSynthesis {
    pub prompt: String,
    pub voice: String,
}

/// Mock synthesizer returning a pure tone at a configurable pitch
#[derive(Clone)]
pub struct MockSpeechSynthesizer {
    behavior: Arc<Mutex<MockBehavior>>,
    tone_hz: Arc<Mutex<f32>>,
    sample_rate: Arc<Mutex<u32>>,
    base64_payload: bool,
    captured: Arc<Mutex<Vec<CapturedSynthesis>>>,
}

impl MockSpeechSynthesizer {
    pub const SAMPLE_RATE: u32 = 24_000;

    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            tone_hz: Arc::new(Mutex::new(120.0)),
            sample_rate: Arc::new(Mutex::new(Self::SAMPLE_RATE)),
            base64_payload: true,
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliver raw bytes instead of base64 text
    pub fn with_raw_payload(mut self) -> Self {
        self.base64_payload = false;
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_tone_hz(&self, hz: f32) {
        *self.tone_hz.lock().unwrap() = hz;
    }

    /// Rate of the generated tone and of the reported MIME type
    pub fn set_sample_rate(&self, rate: u32) {
        *self.sample_rate.lock().unwrap() = rate;
    }

    pub fn get_call_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    pub fn get_captured(&self) -> Vec<CapturedSynthesis> {
        self.captured.lock().unwrap().clone()
    }
}

/// Half a second of a sine tone as 16-bit little-endian PCM.
pub fn tone_pcm(hz: f32, sample_rate: u32) -> Vec<u8> {
    let len = sample_rate as usize / 2;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * PI * hz * t).sin() * 0.6 * i16::MAX as f32) as i16
        })
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn synthesize(
        &self,
        _model: &str,
        prompt: &str,
        voice: &str,
    ) -> Result<SpeechResponse, AiError> {
        self.captured.lock().unwrap().push(CapturedSynthesis {
            prompt: prompt.to_string(),
            voice: voice.to_string(),
        });

        {
            let mut behavior = self.behavior.lock().unwrap();
            MockBehavior::next_outcome(&mut behavior)?;
        }

        let sample_rate = *self.sample_rate.lock().unwrap();
        let pcm = tone_pcm(*self.tone_hz.lock().unwrap(), sample_rate);
        let payload = if self.base64_payload {
            AudioPayload::Base64(base64::engine::general_purpose::STANDARD.encode(pcm))
        } else {
            AudioPayload::Raw(pcm)
        };

        Ok(SpeechResponse {
            parts: vec![AudioPart {
                mime_type: Some(format!("audio/L16;codec=pcm;rate={sample_rate}")),
                payload,
            }],
        })
    }
}
