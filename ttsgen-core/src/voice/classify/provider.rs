use anyhow::Result;
use async_trait::async_trait;

use crate::labeling::Gender;
use crate::voice::audio::Waveform;

/// Predicts the perceived speaker gender of a decoded waveform
#[async_trait]
pub trait GenderClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, waveform: &Waveform) -> Result<Gender>;
}
