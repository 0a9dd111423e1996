//! Speech synthesis, audio persistence and speaker classification

pub mod audio;
pub mod classify;
pub mod tts;
