//! Audio source port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transcription::AudioData;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to encode audio: {0}")]
    EncodeFailed(String),

    #[error("No recording in progress")]
    NotRecording,

    #[error("No audio device available")]
    NoAudioDevice,
}

/// Port for open-ended microphone capture.
///
/// Samples accumulate from `start` until `stop`. The current segment can be
/// read without consuming it (`snapshot`) or taken so that the next segment
/// starts empty (`drain`).
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Whether an input device exists at all
    fn has_input_device(&self) -> bool;

    /// Start capturing
    async fn start(&self) -> Result<(), RecordingError>;

    /// Encode the samples of the current segment without clearing them.
    /// Returns `None` while the segment is still empty.
    async fn snapshot(&self) -> Result<Option<AudioData>, RecordingError>;

    /// Encode and clear the samples of the current segment
    async fn drain(&self) -> Result<Option<AudioData>, RecordingError>;

    /// Stop capturing and discard anything not yet drained
    async fn stop(&self) -> Result<(), RecordingError>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    /// Length of the current segment in milliseconds
    fn segment_ms(&self) -> u64;
}
