//! Capture domain module

#[allow(clippy::module_inception)]
mod capture;
mod settings;
mod transcript;

pub use capture::{
    Capture, CaptureError, CaptureMessage, CaptureMode, CaptureOutcome, SaveOutcome,
};
pub use settings::{LanguageTag, RecognitionSettings, DEFAULT_LANGUAGE};
pub use transcript::{Transcript, TranscriptSegment};
