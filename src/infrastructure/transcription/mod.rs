//! Transcription adapters

mod gemini;

pub use gemini::GeminiTranscriber;
