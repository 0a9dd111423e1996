pub mod ai;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod labeling;
pub mod metadata;
pub mod pipeline;
pub mod runner;
pub mod services;
pub mod settings;
pub mod topics;
pub mod voice;

// Public library API - the types most callers need to assemble and drive a
// generation run. Everything else stays reachable through its module.
pub use ai::provider::TextGenerator;
pub use credentials::{CredentialRotator, ExhaustionPolicy};
pub use error::DatagenError;
pub use labeling::{Gender, GenderStrategy, MismatchPolicy};
pub use metadata::{MetadataRecord, MetadataStore};
pub use pipeline::{SamplePipeline, SamplePipelineBuilder, SampleRequest};
pub use runner::{RunDriver, RunSummary};
pub use services::{GeminiServiceFactory, ServiceFactory};
pub use settings::{Settings, SettingsManager};
pub use voice::classify::GenderClassifier;
pub use voice::tts::provider::SpeechSynthesizer;
