use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// Rate limit or usage cap hit for the active credential
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(anyhow::Error),

    #[error("Retryable error: {0}")]
    Retryable(anyhow::Error),

    #[error("Terminal error: {0}")]
    Terminal(anyhow::Error),
}

impl AiError {
    /// Whether this error (or anything it wraps) signals quota exhaustion.
    pub fn is_quota(&self) -> bool {
        match self {
            AiError::QuotaExceeded(_) => true,
            AiError::Retryable(e) | AiError::Terminal(e) => has_quota_marker(&e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(source: serde_json::Error) -> Self {
        Self::Terminal(anyhow!(source))
    }
}

/// Collaborators are free to surface quota failures as opaque errors, so the
/// text itself is inspected for the markers the Generative Language API uses.
pub fn has_quota_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429") || lower.contains("quota") || lower.contains("resource_exhausted")
}

/// Classify a step failure as a quota signal or not.
///
/// Only errors raised by a collaborator (an [`AiError`], possibly under added
/// context) count. Local failures carry file paths in their messages and are
/// never inspected for quota markers.
pub fn is_quota_failure(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<AiError>()
        .is_some_and(AiError::is_quota)
}
