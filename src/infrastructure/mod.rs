//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: file storage, the
//! microphone, the Gemini API and desktop notifications.

pub mod config;
pub mod notification;
pub mod recognition;
pub mod recording;
pub mod storage;
pub mod transcription;

pub use config::XdgConfigStore;
pub use notification::{create_notifier, NoopNotifier, NotifyRustNotifier};
pub use recognition::{SegmentTiming, SegmentedRecognizer};
pub use recording::CpalAudioSource;
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
pub use transcription::GeminiTranscriber;
