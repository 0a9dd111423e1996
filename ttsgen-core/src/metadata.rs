//! Append-only JSON-lines store of generated samples.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::labeling::Gender;

/// One generated sample as consumed by downstream training pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Path of the WAV file relative to the dataset root
    pub audio_file: String,
    pub text: String,
    pub description: String,
    pub voice_name: String,
    pub style: String,
    pub topic: String,
    pub gender: Gender,
}

/// Single-writer, append-only metadata file. Lines are never rewritten.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {parent:?}"))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &MetadataRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open metadata file {:?}", self.path))?;
        append_line(&mut file, line.as_bytes(), |f, bytes| f.write_all(bytes))
            .with_context(|| format!("Failed to append to {:?}", self.path))?;
        file.sync_data()
            .with_context(|| format!("Failed to sync {:?}", self.path))?;
        Ok(())
    }

    /// All records in insertion order. A store that was never written is empty.
    pub fn read_all(&self) -> Result<Vec<MetadataRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read metadata from {:?}", self.path))?;

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Malformed metadata record on line {}", i + 1))
            })
            .collect()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Run `write` and cut the file back to its previous length if it fails, so
/// a partial line never stays behind for the next append to land on.
fn append_line<F>(file: &mut File, bytes: &[u8], write: F) -> io::Result<()>
where
    F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
{
    let start = file.metadata()?.len();
    if let Err(e) = write(file, bytes) {
        file.set_len(start)?;
        return Err(e);
    }
    Ok(())
}
