//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod notes;
pub mod recording;
pub mod transcription;

// Re-export common types
pub use capture::{Capture, CaptureMode, LanguageTag, RecognitionSettings, Transcript};
pub use config::AppConfig;
pub use error::*;
pub use notes::{Note, NoteCommand, NoteEvent, NoteId, Notebook, SearchQuery};
pub use recording::Duration;
pub use transcription::{AudioData, AudioMimeType, SystemPrompt};
