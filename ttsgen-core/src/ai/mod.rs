pub mod error;
pub mod gemini;
pub mod mock;
pub mod provider;

pub use error::AiError;
pub use gemini::{GeminiConfig, GeminiTextGenerator};
pub use provider::TextGenerator;
