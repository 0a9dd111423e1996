use anyhow::Result;

use crate::voice::audio::pcm::{pcm_from_payload, sample_rate_from_mime};
use crate::voice::audio::AudioFormat;

/// Audio bytes as delivered by a synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    Raw(Vec<u8>),
    /// Base64 text, as JSON APIs ship inline audio
    Base64(String),
}

/// One audio part of a synthesis response
#[derive(Debug, Clone)]
pub struct AudioPart {
    pub mime_type: Option<String>,
    pub payload: AudioPayload,
}

impl AudioPart {
    pub fn pcm_bytes(&self) -> Result<Vec<u8>> {
        pcm_from_payload(&self.payload)
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.mime_type.as_deref().and_then(sample_rate_from_mime)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeechResponse {
    pub parts: Vec<AudioPart>,
}

impl SpeechResponse {
    pub fn first_audio(&self) -> Option<&AudioPart> {
        self.parts.first()
    }
}

/// Decoded 16-bit little-endian PCM ready to be written to disk
#[derive(Debug, Clone)]
pub struct AudioData {
    pub pcm_data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            ..AudioFormat::default()
        }
    }
}
