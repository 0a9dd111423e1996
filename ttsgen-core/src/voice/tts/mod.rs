pub mod gemini;
pub mod mock;
pub mod provider;
pub mod types;

pub use gemini::GeminiSpeechSynthesizer;
pub use provider::SpeechSynthesizer;
pub use types::{AudioData, AudioPart, AudioPayload, SpeechResponse};
