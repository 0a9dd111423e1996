use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::Waveform;
use crate::voice::tts::types::AudioData;

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Write 16-bit PCM as a WAV file.
///
/// The file is written next to its destination, synced, and renamed into
/// place, so `path` either does not exist or holds a complete file.
pub fn write_wav(path: &Path, audio: &AudioData) -> Result<()> {
    let format = audio.format();
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    let partial = partial_path(path);

    let written = write_samples(&partial, spec, &audio.pcm_data).and_then(|()| {
        File::open(&partial)
            .and_then(|f| f.sync_all())
            .with_context(|| format!("Failed to sync {partial:?}"))?;
        fs::rename(&partial, path)
            .with_context(|| format!("Failed to move {partial:?} to {path:?}"))
    });

    if written.is_err() {
        let _ = fs::remove_file(&partial);
    }
    written
}

fn write_samples(path: &Path, spec: hound::WavSpec, pcm: &[u8]) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file {path:?}"))?;
    for chunk in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Read a WAV file as a mono waveform, averaging channels when needed.
pub fn read_waveform(path: &Path) -> Result<Waveform> {
    let reader =
        hound::WavReader::open(path).with_context(|| format!("Failed to open WAV file {path:?}"))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<Result<_, _>>()?,
            bits @ (8 | 24 | 32) => {
                let scale = (1i64 << (bits - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            bits => bail!("Unsupported bit depth: {bits}"),
        },
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    let channels = spec.channels.max(1) as usize;
    let mono = if channels == 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Waveform {
        samples: mono,
        sample_rate: spec.sample_rate,
    })
}
