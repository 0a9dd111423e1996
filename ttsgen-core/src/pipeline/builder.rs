use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::sleeper::{Sleeper, TokioSleeper};
use super::{connect_clients, SamplePipeline, AUDIO_DIR, METADATA_FILE};
use crate::catalog::{DescriptionTemplater, VoiceCatalog};
use crate::credentials::CredentialRotator;
use crate::error::DatagenError;
use crate::metadata::MetadataStore;
use crate::services::{GeminiServiceFactory, ServiceFactory};
use crate::settings::Settings;
use crate::voice::classify::{GenderClassifier, PitchGenderClassifier};

#[derive(Default)]
pub struct SamplePipelineBuilder {
    output_dir: Option<PathBuf>,
    settings: Option<Settings>,
    credentials: Vec<String>,
    services: Option<Box<dyn ServiceFactory>>,
    classifier: Option<Box<dyn GenderClassifier>>,
    sleeper: Option<Box<dyn Sleeper>>,
    catalog: Option<VoiceCatalog>,
    seed: Option<u64>,
}

impl SamplePipelineBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn credentials<I, S>(mut self, credentials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credentials = credentials.into_iter().map(Into::into).collect();
        self
    }

    pub fn services(mut self, services: impl ServiceFactory + 'static) -> Self {
        self.services = Some(Box::new(services));
        self
    }

    pub fn classifier(mut self, classifier: impl GenderClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Box::new(sleeper));
        self
    }

    pub fn catalog(mut self, catalog: VoiceCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Overrides the seed from settings
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration, prepare the output layout and connect the
    /// first credential.
    pub fn build(self) -> Result<SamplePipeline, DatagenError> {
        let settings = self.settings.unwrap_or_default();
        if settings.max_attempts == 0 {
            return Err(DatagenError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let output_dir = self
            .output_dir
            .ok_or_else(|| DatagenError::Configuration("Output directory not set".to_string()))?;
        let audio_dir = output_dir.join(AUDIO_DIR);
        std::fs::create_dir_all(&audio_dir).map_err(|e| {
            DatagenError::Configuration(format!(
                "Failed to create audio directory {}: {e}",
                audio_dir.display()
            ))
        })?;
        let store = MetadataStore::open(output_dir.join(METADATA_FILE))
            .map_err(|e| DatagenError::Configuration(format!("{e:#}")))?;

        let rotator = CredentialRotator::new(self.credentials, settings.exhaustion_policy)?;

        let classifier: Option<Box<dyn GenderClassifier>> = match self.classifier {
            Some(classifier) => Some(classifier),
            None if settings.gender_strategy.requires_classifier() => Some(Box::new(
                PitchGenderClassifier::new(settings.pitch_threshold_hz),
            )),
            None => None,
        };

        let rng = match self.seed.or(settings.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let services = self
            .services
            .unwrap_or_else(|| Box::new(GeminiServiceFactory::from_settings(&settings)));

        info!(
            output_dir = %output_dir.display(),
            credentials = rotator.len(),
            strategy = ?settings.gender_strategy,
            "Building sample pipeline"
        );

        let (text_client, speech_client) = connect_clients(services.as_ref(), &rotator)?;

        Ok(SamplePipeline {
            settings,
            rotator,
            services,
            text_client,
            speech_client,
            classifier,
            catalog: self.catalog.unwrap_or_else(VoiceCatalog::builtin),
            templater: DescriptionTemplater::new(),
            store,
            output_dir,
            sleeper: self.sleeper.unwrap_or_else(|| Box::new(TokioSleeper)),
            rng,
        })
    }
}
