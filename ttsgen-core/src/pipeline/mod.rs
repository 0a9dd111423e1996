//! Per-sample orchestration: text, speech, audio file, label, record.
//!
//! Each call to [`SamplePipeline::generate`] runs up to `max_attempts`
//! attempts. An attempt walks through the [`AttemptStage`]s in order; any
//! failure ends the attempt, rotates credentials when the failure is a quota
//! signal, and backs off before the next one. Running out of attempts is
//! not an error, the sample is simply skipped.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::ai::error::is_quota_failure;
use crate::ai::provider::TextGenerator;
use crate::catalog::{DescriptionTemplater, TemplateId, Voice, VoiceCatalog};
use crate::credentials::CredentialRotator;
use crate::error::DatagenError;
use crate::labeling::{Gender, GenderStrategy, PendingLabel};
use crate::metadata::{MetadataRecord, MetadataStore};
use crate::services::ServiceFactory;
use crate::settings::Settings;
use crate::voice::audio::wav::{read_waveform, write_wav};
use crate::voice::audio::SampleId;
use crate::voice::classify::GenderClassifier;
use crate::voice::tts::provider::SpeechSynthesizer;
use crate::voice::tts::types::AudioData;

mod builder;
pub mod sleeper;

pub use builder::SamplePipelineBuilder;
pub use sleeper::{backoff_delay, RecordingSleeper, Sleeper, TokioSleeper};

/// Directory under the output root holding the WAV files
pub const AUDIO_DIR: &str = "audio";
/// Metadata file name under the output root
pub const METADATA_FILE: &str = "metadata.jsonl";

/// What to generate. Unset voice and style are drawn from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRequest {
    pub topic: String,
    pub voice: Option<String>,
    pub style: Option<String>,
}

impl SampleRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Progress of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    Start,
    TextRequested,
    TextOk,
    AudioRequested,
    AudioOk,
    Persisted,
    GenderResolved,
    Recorded,
}

/// Choices fixed for every attempt of one sample
#[derive(Debug, Clone)]
struct SamplePlan {
    topic: String,
    voice: Voice,
    style: String,
    template: TemplateId,
    pending: PendingLabel,
}

/// Prompt asking the language model for a short spoken explanation.
pub fn teaching_prompt(topic: &str, style: &str) -> String {
    format!(
        "You are a teacher feeling {style}. Explain \"{topic}\" to a curious student \
         as if speaking out loud. Keep it under 60 words and use plain sentences \
         with no lists or markdown."
    )
}

pub struct SamplePipeline {
    settings: Settings,
    rotator: CredentialRotator,
    services: Box<dyn ServiceFactory>,
    text_client: Box<dyn TextGenerator>,
    speech_client: Box<dyn SpeechSynthesizer>,
    classifier: Option<Box<dyn GenderClassifier>>,
    catalog: VoiceCatalog,
    templater: DescriptionTemplater,
    store: MetadataStore,
    output_dir: PathBuf,
    sleeper: Box<dyn Sleeper>,
    rng: StdRng,
}

impl fmt::Debug for SamplePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplePipeline")
            .field("rotator", &self.rotator)
            .field("text_client", &self.text_client.name())
            .field("speech_client", &self.speech_client.name())
            .field("classifier", &self.classifier.as_ref().map(|c| c.name()))
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl SamplePipeline {
    pub fn builder() -> SamplePipelineBuilder {
        SamplePipelineBuilder::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn rotator(&self) -> &CredentialRotator {
        &self.rotator
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.output_dir.join(AUDIO_DIR)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Produce one sample.
    ///
    /// Returns `Ok(None)` when every attempt failed (or the request cannot be
    /// served by the configured strategy) and `Err` only when the credential
    /// rotator gives up under the fatal exhaustion policy.
    pub async fn generate(
        &mut self,
        request: SampleRequest,
    ) -> Result<Option<MetadataRecord>, DatagenError> {
        let Some(plan) = self.plan(request) else {
            return Ok(None);
        };
        let max_attempts = self.settings.max_attempts;

        for attempt in 0..max_attempts {
            let mut stage = AttemptStage::Start;
            let result = self.run_attempt(&plan, &mut stage).await;
            match result {
                Ok(record) => {
                    info!(
                        audio_file = %record.audio_file,
                        voice = %record.voice_name,
                        style = %record.style,
                        gender = %record.gender,
                        "Sample recorded"
                    );
                    return Ok(Some(record));
                }
                Err(e) => {
                    let quota = is_quota_failure(&e);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        ?stage,
                        quota,
                        "Attempt {} failed: {:#}",
                        attempt + 1,
                        e
                    );
                    if quota {
                        self.rotate_credentials()?;
                    }
                    let delay = backoff_delay(self.settings.backoff_base(), attempt);
                    debug!(?delay, "Backing off");
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        warn!(
            topic = %plan.topic,
            max_attempts,
            "Giving up on sample after exhausting attempts"
        );
        Ok(None)
    }

    fn plan(&mut self, request: SampleRequest) -> Option<SamplePlan> {
        let voice = self
            .catalog
            .resolve_voice(request.voice.as_deref(), &mut self.rng)?;
        let style = self
            .catalog
            .resolve_style(request.style.as_deref(), &mut self.rng)?;

        let strategy = self.settings.gender_strategy;
        let Some(pending) = strategy.initial_label(voice.gender) else {
            warn!(
                voice = %voice.name,
                ?strategy,
                "Voice has no catalog gender, skipping sample"
            );
            return None;
        };

        let template = self.templater.pick(&mut self.rng);
        info!(
            voice = %voice.name,
            pitch = voice.pitch.as_deref().unwrap_or("unknown"),
            style = %style,
            "Planned sample"
        );
        Some(SamplePlan {
            topic: request.topic,
            voice,
            style,
            template,
            pending,
        })
    }

    async fn run_attempt(
        &mut self,
        plan: &SamplePlan,
        stage: &mut AttemptStage,
    ) -> Result<MetadataRecord> {
        *stage = AttemptStage::TextRequested;
        let prompt = teaching_prompt(&plan.topic, &plan.style);
        let text = self
            .text_client
            .generate(&self.settings.text_model, &prompt)
            .await
            .context("Text generation failed")?
            .trim()
            .to_string();
        *stage = AttemptStage::TextOk;
        debug!(chars = text.len(), "Generated text");

        let caption =
            self.templater
                .render(plan.template, plan.pending.caption_token(), &plan.style);
        let synthesis_prompt = format!("{caption}: {text}");

        *stage = AttemptStage::AudioRequested;
        let response = self
            .speech_client
            .synthesize(
                &self.settings.speech_model,
                &synthesis_prompt,
                &plan.voice.name,
            )
            .await
            .context("Speech synthesis failed")?;
        let part = response
            .first_audio()
            .context("Synthesis response has no audio part")?;
        let pcm_data = part.pcm_bytes()?;
        if pcm_data.is_empty() {
            bail!("Synthesis response contained no audio samples");
        }
        let sample_rate = part.sample_rate().unwrap_or(self.settings.sample_rate);
        if sample_rate != self.settings.sample_rate {
            bail!(
                "Synthesizer returned {} Hz audio, expected {} Hz",
                sample_rate,
                self.settings.sample_rate
            );
        }
        let audio = AudioData {
            pcm_data,
            sample_rate,
            channels: 1,
        };
        *stage = AttemptStage::AudioOk;

        let file_name = SampleId::new().file_name();
        let audio_path = self.audio_dir().join(&file_name);
        write_wav(&audio_path, &audio)?;
        *stage = AttemptStage::Persisted;

        let predicted = self.classify(&audio_path).await?;
        let strategy = self.settings.gender_strategy;
        let outcome = strategy.finalize(self.settings.mismatch_policy, plan.pending, predicted)?;
        if let Some(found) = outcome.mismatch {
            warn!(
                voice = %plan.voice.name,
                expected = %plan.pending.caption_token(),
                classified = %found,
                recorded = %outcome.gender,
                "Classifier disagrees with catalog gender"
            );
        }
        let description = self
            .templater
            .render(plan.template, outcome.gender.caption_token(), &plan.style);
        *stage = AttemptStage::GenderResolved;

        let record = MetadataRecord {
            audio_file: format!("{AUDIO_DIR}/{file_name}"),
            text,
            description,
            voice_name: plan.voice.name.clone(),
            style: plan.style.clone(),
            topic: plan.topic.clone(),
            gender: outcome.gender,
        };
        self.store.append(&record)?;
        *stage = AttemptStage::Recorded;

        Ok(record)
    }

    /// Run the classifier on the persisted file when the strategy calls for it.
    ///
    /// Under `ValidatedStaticLabel` a classifier failure is logged and the
    /// catalog label stands; under `ClassifierDerivedLabel` it fails the attempt.
    async fn classify(&self, audio_path: &Path) -> Result<Option<Gender>> {
        let strategy = self.settings.gender_strategy;
        if !strategy.requires_classifier() {
            return Ok(None);
        }
        let classifier = self
            .classifier
            .as_ref()
            .context("Gender strategy requires a classifier but none is configured")?;

        let result = match read_waveform(audio_path) {
            Ok(waveform) => classifier.classify(&waveform).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(gender) => Ok(Some(gender)),
            Err(e) if strategy == GenderStrategy::ClassifierDerivedLabel => {
                Err(e.context("Gender classification failed"))
            }
            Err(e) => {
                warn!(error = %e, "Gender consistency check failed, keeping catalog label");
                Ok(None)
            }
        }
    }

    fn rotate_credentials(&mut self) -> Result<(), DatagenError> {
        self.rotator.rotate_on_quota_failure()?;
        self.connect()
    }

    /// Rebuild the service clients for the active credential.
    fn connect(&mut self) -> Result<(), DatagenError> {
        let (text_client, speech_client) =
            connect_clients(self.services.as_ref(), &self.rotator)?;
        self.text_client = text_client;
        self.speech_client = speech_client;
        Ok(())
    }
}

type Clients = (Box<dyn TextGenerator>, Box<dyn SpeechSynthesizer>);

fn connect_clients(
    services: &dyn ServiceFactory,
    rotator: &CredentialRotator,
) -> Result<Clients, DatagenError> {
    let credential = rotator.current();
    let text_client = services
        .text_generator(credential)
        .map_err(|e| DatagenError::Configuration(format!("Failed to build text client: {e}")))?;
    let speech_client = services
        .speech_synthesizer(credential)
        .map_err(|e| DatagenError::Configuration(format!("Failed to build speech client: {e}")))?;
    info!(
        "Initialized service clients with key {}/{}",
        rotator.cursor() + 1,
        rotator.len()
    );
    Ok((text_client, speech_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teaching_prompt_embeds_topic_and_style() {
        let prompt = teaching_prompt("How do plants eat sunlight?", "cheerful");
        assert!(prompt.starts_with("You are a teacher feeling cheerful."));
        assert!(prompt.contains("\"How do plants eat sunlight?\""));
    }

    #[test]
    fn test_sample_request_builders() {
        let request = SampleRequest::new("Tides").with_voice("Kore").with_style("calm");
        assert_eq!(request.topic, "Tides");
        assert_eq!(request.voice.as_deref(), Some("Kore"));
        assert_eq!(request.style.as_deref(), Some("calm"));
    }
}
