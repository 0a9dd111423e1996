//! Gender labels and the policies for assigning them to a sample.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Caption token used before a classifier has produced a label
pub const PLACEHOLDER_TOKEN: &str = "person";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Word used for this gender in captions
    pub fn caption_token(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the `gender` field of a record is decided. Chosen once per deployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenderStrategy {
    /// The voice's catalog gender, no classifier involved
    #[default]
    StaticLabel,
    /// The voice's catalog gender, cross-checked by the classifier after synthesis
    ValidatedStaticLabel,
    /// Whatever the classifier predicts from the persisted audio
    ClassifierDerivedLabel,
}

impl GenderStrategy {
    pub fn requires_classifier(&self) -> bool {
        !matches!(self, GenderStrategy::StaticLabel)
    }

    /// The label known before synthesis, or `None` when a static strategy is
    /// used with a voice that has no catalog gender.
    pub fn initial_label(&self, static_gender: Option<Gender>) -> Option<PendingLabel> {
        match self {
            GenderStrategy::StaticLabel | GenderStrategy::ValidatedStaticLabel => {
                static_gender.map(PendingLabel::Known)
            }
            GenderStrategy::ClassifierDerivedLabel => Some(PendingLabel::Placeholder),
        }
    }

    /// Settle the record's label once the classifier (if any) has run.
    pub fn finalize(
        &self,
        policy: MismatchPolicy,
        pending: PendingLabel,
        predicted: Option<Gender>,
    ) -> Result<LabelOutcome> {
        match (self, pending, predicted) {
            (GenderStrategy::StaticLabel, PendingLabel::Known(gender), _) => Ok(LabelOutcome {
                gender,
                mismatch: None,
            }),
            (GenderStrategy::ValidatedStaticLabel, PendingLabel::Known(expected), Some(found)) => {
                let mismatch = (expected != found).then_some(found);
                let gender = match (mismatch, policy) {
                    (Some(found), MismatchPolicy::PreferClassifier) => found,
                    _ => expected,
                };
                Ok(LabelOutcome { gender, mismatch })
            }
            // The check is advisory; a failed classification keeps the catalog label.
            (GenderStrategy::ValidatedStaticLabel, PendingLabel::Known(gender), None) => {
                Ok(LabelOutcome {
                    gender,
                    mismatch: None,
                })
            }
            (GenderStrategy::ClassifierDerivedLabel, _, Some(found)) => Ok(LabelOutcome {
                gender: found,
                mismatch: None,
            }),
            (strategy, pending, predicted) => bail!(
                "Cannot settle label for {strategy:?} with {pending:?} and prediction {predicted:?}"
            ),
        }
    }
}

impl FromStr for GenderStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "static" | "static_label" => Ok(GenderStrategy::StaticLabel),
            "validated" | "validated_static_label" => Ok(GenderStrategy::ValidatedStaticLabel),
            "classifier" | "classifier_derived_label" => {
                Ok(GenderStrategy::ClassifierDerivedLabel)
            }
            other => bail!("Unknown gender strategy: {other}"),
        }
    }
}

/// What a classifier disagreement does under `ValidatedStaticLabel`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Keep the catalog label and only log the disagreement
    #[default]
    LogOnly,
    /// Replace the catalog label with the classifier's
    PreferClassifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLabel {
    Known(Gender),
    Placeholder,
}

impl PendingLabel {
    pub fn caption_token(&self) -> &'static str {
        match self {
            PendingLabel::Known(gender) => gender.caption_token(),
            PendingLabel::Placeholder => PLACEHOLDER_TOKEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOutcome {
    pub gender: Gender,
    /// Classifier label when it disagreed with the catalog
    pub mismatch: Option<Gender>,
}
