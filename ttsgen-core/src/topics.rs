use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

/// Topics used when no topic file is available
pub const DEFAULT_TOPICS: &[&str] = &[
    "How do plants eat sunlight?",
    "Why is the sky blue?",
    "How do volcanoes erupt?",
    "What makes a rainbow appear?",
    "How does the heart pump blood?",
    "Why do we have seasons?",
    "How do bees make honey?",
    "What is gravity?",
];

/// Load a JSON array of topic strings, falling back to [`DEFAULT_TOPICS`]
/// when the file does not exist.
pub fn load_topics(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!(?path, "Topic file not found, using built-in topics");
        return Ok(DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect());
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read topics from {path:?}"))?;
    let topics: Vec<String> = serde_json::from_str(&contents)
        .with_context(|| format!("Topic file {path:?} must be a JSON array of strings"))?;

    let topics: Vec<String> = topics
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if topics.is_empty() {
        bail!("Topic file {path:?} contains no topics");
    }

    info!(count = topics.len(), ?path, "Loaded topics");
    Ok(topics)
}
