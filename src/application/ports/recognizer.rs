//! Speech recognition port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{RecognitionSettings, Transcript};

/// Recognition errors
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("Speech recognition is not available: {0}")]
    Unavailable(String),

    #[error("Failed to start speech recognition: {0}")]
    StartFailed(String),

    #[error("Audio capture failed: {0}")]
    Audio(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),
}

/// Events delivered by a running dictation session
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Every segment recognized so far, finalized and in progress
    Result(Transcript),
    /// Runtime failure; the session delivers nothing after this
    Error(RecognitionError),
}

/// Port for a speech-to-text capability
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Check whether dictation can run at all.
    ///
    /// Returns the reason when it cannot.
    fn check_available(&self) -> Result<(), RecognitionError>;

    /// Open a new session. Each call returns a fresh handle owned by the
    /// caller; nothing is shared between sessions.
    async fn start(
        &self,
        settings: RecognitionSettings,
    ) -> Result<Box<dyn DictationSession>, RecognitionError>;
}

/// Handle to one live speech-to-text stream
#[async_trait]
pub trait DictationSession: Send {
    /// Wait for the next event. `None` once the session has ended.
    async fn next_event(&mut self) -> Option<RecognitionEvent>;

    /// Close the session, finishing any speech not yet recognized.
    ///
    /// Returns the events produced while finishing, typically one final
    /// result. Nothing is delivered through `next_event` afterwards.
    async fn stop(&mut self) -> Vec<RecognitionEvent>;
}
