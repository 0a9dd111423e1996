//! Speaker gender classification for generated audio

pub mod mock;
pub mod pitch;
pub mod provider;

pub use pitch::PitchGenderClassifier;
pub use provider::GenderClassifier;
