use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::gemini::DEFAULT_BASE_URL;
use crate::credentials::ExhaustionPolicy;
use crate::labeling::{GenderStrategy, MismatchPolicy};

fn default_text_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_inter_sample_delay_ms() -> u64 {
    1000
}

fn default_sample_rate() -> u32 {
    24_000
}

fn default_pitch_threshold_hz() -> f32 {
    165.0
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Generation settings, usually loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Attempts per sample, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait after failed attempt `k` is `backoff_base_ms * 2^k`
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_inter_sample_delay_ms")]
    pub inter_sample_delay_ms: u64,

    #[serde(default)]
    pub gender_strategy: GenderStrategy,

    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,

    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,

    /// Used when the synthesizer does not report a rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_pitch_threshold_hz")]
    pub pitch_threshold_hz: f32,

    /// Fixed seed for voice, style, template and topic selection
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            speech_model: default_speech_model(),
            api_base_url: default_api_base_url(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            inter_sample_delay_ms: default_inter_sample_delay_ms(),
            gender_strategy: GenderStrategy::default(),
            mismatch_policy: MismatchPolicy::default(),
            exhaustion_policy: ExhaustionPolicy::default(),
            sample_rate: default_sample_rate(),
            pitch_threshold_hz: default_pitch_threshold_hz(),
            seed: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn inter_sample_delay(&self) -> Duration {
        Duration::from_millis(self.inter_sample_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
