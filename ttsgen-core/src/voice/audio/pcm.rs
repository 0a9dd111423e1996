use anyhow::{Context, Result};
use base64::Engine;
use tracing::debug;

use crate::voice::tts::types::AudioPayload;

/// Extract 16-bit PCM bytes from a synthesizer payload.
///
/// Base64 text is decoded first. A dangling odd byte cannot form a sample
/// and is dropped.
pub fn pcm_from_payload(payload: &AudioPayload) -> Result<Vec<u8>> {
    let mut bytes = match payload {
        AudioPayload::Raw(bytes) => bytes.clone(),
        AudioPayload::Base64(encoded) => {
            let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .context("Failed to decode base64 audio payload")?
        }
    };

    if bytes.len() % 2 != 0 {
        debug!(len = bytes.len(), "Dropping trailing odd PCM byte");
        bytes.pop();
    }
    Ok(bytes)
}

/// Parse the `rate=` parameter of an `audio/L16` style MIME type.
pub fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
}
