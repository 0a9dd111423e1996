//! Fundamental-frequency based gender classifier.
//!
//! Estimates F0 per frame with normalized autocorrelation and compares the
//! median voiced F0 against a threshold. Adult male speech typically sits
//! around 85-155 Hz and female speech around 165-255 Hz.

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::debug;

use super::provider::GenderClassifier;
use crate::labeling::Gender;
use crate::voice::audio::Waveform;

const MIN_F0_HZ: f32 = 60.0;
const MAX_F0_HZ: f32 = 400.0;
const SILENCE_RMS: f32 = 0.01;
const VOICING_THRESHOLD: f32 = 0.5;
/// Fraction of the best correlation a shorter lag needs to win; avoids octave errors.
const FIRST_PEAK_RATIO: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct PitchGenderClassifier {
    threshold_hz: f32,
}

impl PitchGenderClassifier {
    pub fn new(threshold_hz: f32) -> Self {
        Self { threshold_hz }
    }

    /// Median F0 over voiced frames, or `None` if nothing was voiced.
    pub fn median_f0(&self, waveform: &Waveform) -> Option<f32> {
        let sr = waveform.sample_rate as f32;
        if sr <= 0.0 {
            return None;
        }
        let min_lag = (sr / MAX_F0_HZ).floor().max(1.0) as usize;
        let max_lag = (sr / MIN_F0_HZ).ceil() as usize;
        let frame_len = (2 * max_lag).max((sr * 0.04) as usize);
        let hop = (frame_len / 2).max(1);

        let mut pitches: Vec<f32> = waveform
            .samples
            .windows(frame_len)
            .step_by(hop)
            .filter_map(|frame| frame_pitch(frame, min_lag, max_lag))
            .map(|lag| sr / lag as f32)
            .collect();

        if pitches.is_empty() {
            return None;
        }
        pitches.sort_by(|a, b| a.total_cmp(b));
        Some(pitches[pitches.len() / 2])
    }
}

impl Default for PitchGenderClassifier {
    fn default() -> Self {
        Self::new(165.0)
    }
}

fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f32 {
    let (head, tail) = (&frame[..frame.len() - lag], &frame[lag..]);
    let mut cross = 0.0f32;
    let mut energy_head = 0.0f32;
    let mut energy_tail = 0.0f32;
    for (a, b) in head.iter().zip(tail) {
        cross += a * b;
        energy_head += a * a;
        energy_tail += b * b;
    }
    let denom = (energy_head * energy_tail).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cross / denom
    }
}

/// Best pitch lag for one frame, `None` for silent or unvoiced frames.
fn frame_pitch(frame: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
    let rms = (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt();
    if rms < SILENCE_RMS || max_lag >= frame.len() {
        return None;
    }

    let scores: Vec<f32> = (min_lag..=max_lag + 1)
        .map(|lag| normalized_autocorrelation(frame, lag.min(frame.len() - 1)))
        .collect();
    let best = scores[..scores.len() - 1]
        .iter()
        .copied()
        .fold(f32::MIN, f32::max);
    if best < VOICING_THRESHOLD {
        return None;
    }

    (1..scores.len() - 1)
        .find(|&i| {
            scores[i] >= FIRST_PEAK_RATIO * best
                && scores[i] >= scores[i - 1]
                && scores[i] >= scores[i + 1]
        })
        .map(|i| min_lag + i)
}

#[async_trait]
impl GenderClassifier for PitchGenderClassifier {
    fn name(&self) -> &'static str {
        "pitch"
    }

    async fn classify(&self, waveform: &Waveform) -> Result<Gender> {
        let Some(f0) = self.median_f0(waveform) else {
            bail!(
                "No voiced frames in {:.2}s of audio",
                waveform.duration_secs()
            );
        };
        let gender = if f0 < self.threshold_hz {
            Gender::Male
        } else {
            Gender::Female
        };
        debug!(f0, threshold = self.threshold_hz, %gender, "Classified speaker pitch");
        Ok(gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::tts::mock::tone_pcm;

    fn tone(hz: f32) -> Waveform {
        let samples = tone_pcm(hz, 24_000)
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0)
            .collect();
        Waveform {
            samples,
            sample_rate: 24_000,
        }
    }

    #[test]
    fn test_median_f0_tracks_tone() {
        let classifier = PitchGenderClassifier::default();
        let f0 = classifier.median_f0(&tone(120.0)).unwrap();
        assert!((f0 - 120.0).abs() < 3.0, "estimated {f0}");

        let f0 = classifier.median_f0(&tone(220.0)).unwrap();
        assert!((f0 - 220.0).abs() < 5.0, "estimated {f0}");
    }

    #[tokio::test]
    async fn test_low_tone_is_male_high_tone_is_female() {
        let classifier = PitchGenderClassifier::default();
        assert_eq!(classifier.classify(&tone(120.0)).await.unwrap(), Gender::Male);
        assert_eq!(
            classifier.classify(&tone(220.0)).await.unwrap(),
            Gender::Female
        );
    }

    #[tokio::test]
    async fn test_silence_is_an_error() {
        let classifier = PitchGenderClassifier::default();
        let silence = Waveform {
            samples: vec![0.0; 24_000],
            sample_rate: 24_000,
        };
        assert!(classifier.classify(&silence).await.is_err());
    }
}
