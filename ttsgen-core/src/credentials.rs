//! API credential rotation on quota exhaustion.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::DatagenError;

/// What happens when the cursor moves past the last credential
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Stop with `CredentialsExhausted`
    #[default]
    Fatal,
    /// Start over from the first credential
    WrapAround,
}

/// Render a credential for logs without revealing it.
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub struct CredentialRotator {
    credentials: Vec<String>,
    cursor: usize,
    rotations: usize,
    policy: ExhaustionPolicy,
    exhausted: bool,
}

impl CredentialRotator {
    pub fn new(credentials: Vec<String>, policy: ExhaustionPolicy) -> Result<Self, DatagenError> {
        if credentials.is_empty() {
            return Err(DatagenError::Configuration(
                "At least one API key is required".to_string(),
            ));
        }
        info!(
            count = credentials.len(),
            ?policy,
            "Loaded API credentials"
        );
        Ok(Self {
            credentials,
            cursor: 0,
            rotations: 0,
            policy,
            exhausted: false,
        })
    }

    pub fn current(&self) -> &str {
        &self.credentials[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total successful rotations since construction
    pub fn rotations(&self) -> usize {
        self.rotations
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advance to the next credential after a quota failure.
    ///
    /// Under `Fatal` the rotator stays exhausted once it has run past the
    /// last credential; `current()` keeps returning the last one.
    pub fn rotate_on_quota_failure(&mut self) -> Result<&str, DatagenError> {
        if self.exhausted {
            return Err(DatagenError::CredentialsExhausted {
                tried: self.credentials.len(),
            });
        }

        let next = self.cursor + 1;
        if next >= self.credentials.len() {
            match self.policy {
                ExhaustionPolicy::Fatal => {
                    self.exhausted = true;
                    warn!(
                        tried = self.credentials.len(),
                        "All API keys exhausted or quota reached"
                    );
                    return Err(DatagenError::CredentialsExhausted {
                        tried: self.credentials.len(),
                    });
                }
                ExhaustionPolicy::WrapAround => {
                    warn!("All API keys hit quota once, wrapping around to the first key");
                    self.cursor = 0;
                }
            }
        } else {
            self.cursor = next;
        }

        self.rotations += 1;
        info!(
            key = %mask_credential(self.current()),
            "Rotated to API key {}/{}",
            self.cursor + 1,
            self.credentials.len()
        );
        Ok(self.current())
    }
}

impl fmt::Debug for CredentialRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRotator")
            .field(
                "credentials",
                &self
                    .credentials
                    .iter()
                    .map(|c| mask_credential(c))
                    .collect::<Vec<_>>(),
            )
            .field("cursor", &self.cursor)
            .field("rotations", &self.rotations)
            .field("policy", &self.policy)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
