//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod notifier;
pub mod recognizer;
pub mod recorder;
pub mod storage;
pub mod transcriber;

// Re-export common types
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use recognizer::{DictationSession, RecognitionError, RecognitionEvent, SpeechRecognizer};
pub use recorder::{AudioSource, RecordingError};
pub use storage::{validate_key, KeyValueStore, StorageError};
pub use transcriber::{Transcriber, TranscriptionError};
