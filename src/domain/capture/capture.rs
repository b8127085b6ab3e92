//! Note capture state machine

use std::fmt;
use thiserror::Error;

use super::transcript::Transcript;

/// Capture modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureMode {
    /// No input mode chosen yet
    #[default]
    Onboarding,
    /// Free-text editing
    Text,
    /// A dictation session is feeding the buffer
    Dictation,
}

impl CaptureMode {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Text => "text",
            Self::Dictation => "dictation",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid capture transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid capture transition: cannot {action} while in {current_mode} mode")]
pub struct CaptureError {
    pub current_mode: CaptureMode,
    pub action: String,
}

/// Messages dispatched into a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureMessage {
    StartEditor,
    StartDictation,
    /// Full transcript so far, replacing the buffer
    TranscriptUpdated(String),
    /// Direct edit of the whole buffer
    Edit(String),
    StopDictation,
    /// The recognizer reported an error; no more updates will be applied
    RecognitionFailed,
    Save,
}

/// Outcome of a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Buffer was empty, nothing to save
    Empty,
    /// Content handed over for storage; the buffer has been cleared
    Ready(String),
}

/// Outcome of handling a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Applied,
    /// Message had no effect in the current mode (e.g. a stale transcript)
    Ignored,
    Saved(SaveOutcome),
}

/// Capture entity.
/// Owns the content buffer a note is created from.
///
/// State machine:
///   ONBOARDING -> TEXT (start_editor)
///   ONBOARDING | TEXT -> DICTATION (start_dictation)
///   DICTATION -> TEXT (stop_dictation, recognition_failed)
///   TEXT -> ONBOARDING (edit to empty, save)
#[derive(Debug, Default)]
pub struct Capture {
    mode: CaptureMode,
    buffer: String,
}

impl Capture {
    /// Create a new capture in onboarding mode
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_dictating(&self) -> bool {
        self.mode == CaptureMode::Dictation
    }

    /// Switch to free-text editing
    pub fn start_editor(&mut self) -> Result<(), CaptureError> {
        match self.mode {
            CaptureMode::Dictation => Err(self.invalid("start the editor")),
            _ => {
                self.mode = CaptureMode::Text;
                Ok(())
            }
        }
    }

    /// Enter dictation mode. Only one dictation may be active at a time.
    pub fn start_dictation(&mut self) -> Result<(), CaptureError> {
        if self.mode == CaptureMode::Dictation {
            return Err(self.invalid("start dictation"));
        }
        self.mode = CaptureMode::Dictation;
        Ok(())
    }

    /// Replace the buffer with the latest transcript.
    ///
    /// Returns false (and leaves the buffer alone) outside dictation.
    pub fn transcript_updated(&mut self, text: impl Into<String>) -> bool {
        if self.mode != CaptureMode::Dictation {
            return false;
        }
        self.buffer = text.into();
        true
    }

    /// Replace the buffer with a full transcript
    pub fn apply_transcript(&mut self, transcript: &Transcript) -> bool {
        self.transcript_updated(transcript.text())
    }

    /// Replace the buffer with edited text
    pub fn edit(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        match self.mode {
            CaptureMode::Dictation => {}
            _ if self.buffer.is_empty() => self.mode = CaptureMode::Onboarding,
            _ => self.mode = CaptureMode::Text,
        }
    }

    /// Leave dictation; the buffer stays as ordinary editable text
    pub fn stop_dictation(&mut self) -> Result<(), CaptureError> {
        if self.mode != CaptureMode::Dictation {
            return Err(self.invalid("stop dictation"));
        }
        self.mode = CaptureMode::Text;
        Ok(())
    }

    /// Halt dictation after a recognizer error, keeping the buffer.
    ///
    /// Returns false when no dictation was active.
    pub fn recognition_failed(&mut self) -> bool {
        if self.mode != CaptureMode::Dictation {
            return false;
        }
        self.mode = CaptureMode::Text;
        true
    }

    /// Hand the buffer over for storage.
    ///
    /// An empty buffer is a no-op. Saving while dictating is rejected; the
    /// session has to be stopped first.
    pub fn save(&mut self) -> Result<SaveOutcome, CaptureError> {
        if self.mode == CaptureMode::Dictation {
            return Err(self.invalid("save"));
        }
        if self.buffer.is_empty() {
            return Ok(SaveOutcome::Empty);
        }
        let content = std::mem::take(&mut self.buffer);
        self.mode = CaptureMode::Onboarding;
        Ok(SaveOutcome::Ready(content))
    }

    /// Dispatch a message to the matching transition
    pub fn handle(&mut self, message: CaptureMessage) -> Result<CaptureOutcome, CaptureError> {
        let applied = |ok: bool| {
            if ok {
                CaptureOutcome::Applied
            } else {
                CaptureOutcome::Ignored
            }
        };

        match message {
            CaptureMessage::StartEditor => self.start_editor().map(|_| CaptureOutcome::Applied),
            CaptureMessage::StartDictation => {
                self.start_dictation().map(|_| CaptureOutcome::Applied)
            }
            CaptureMessage::TranscriptUpdated(text) => Ok(applied(self.transcript_updated(text))),
            CaptureMessage::Edit(text) => {
                self.edit(text);
                Ok(CaptureOutcome::Applied)
            }
            CaptureMessage::StopDictation => {
                self.stop_dictation().map(|_| CaptureOutcome::Applied)
            }
            CaptureMessage::RecognitionFailed => Ok(applied(self.recognition_failed())),
            CaptureMessage::Save => self.save().map(CaptureOutcome::Saved),
        }
    }

    fn invalid(&self, action: &str) -> CaptureError {
        CaptureError {
            current_mode: self.mode,
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::TranscriptSegment;

    #[test]
    fn new_capture_is_onboarding() {
        let capture = Capture::new();
        assert_eq!(capture.mode(), CaptureMode::Onboarding);
        assert_eq!(capture.buffer(), "");
    }

    #[test]
    fn text_mode_save() {
        let mut capture = Capture::new();
        capture.start_editor().unwrap();
        capture.edit("buy milk");

        let outcome = capture.save().unwrap();
        assert_eq!(outcome, SaveOutcome::Ready("buy milk".to_string()));
        assert_eq!(capture.buffer(), "");
        assert_eq!(capture.mode(), CaptureMode::Onboarding);
    }

    #[test]
    fn save_empty_is_noop() {
        let mut capture = Capture::new();
        capture.start_editor().unwrap();

        assert_eq!(capture.save().unwrap(), SaveOutcome::Empty);
        assert_eq!(capture.mode(), CaptureMode::Text);
    }

    #[test]
    fn editing_to_empty_returns_to_onboarding() {
        let mut capture = Capture::new();
        capture.edit("x");
        assert_eq!(capture.mode(), CaptureMode::Text);
        capture.edit("");
        assert_eq!(capture.mode(), CaptureMode::Onboarding);
    }

    #[test]
    fn transcript_replaces_instead_of_appending() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();

        assert!(capture.transcript_updated("hello"));
        assert!(capture.transcript_updated("hello world"));
        assert_eq!(capture.buffer(), "hello world");
    }

    #[test]
    fn transcript_from_segments() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();

        let transcript = Transcript::from_segments(vec![
            TranscriptSegment::finalized("olá"),
            TranscriptSegment::interim(" mundo"),
        ]);
        assert!(capture.apply_transcript(&transcript));
        assert_eq!(capture.buffer(), "olá mundo");
    }

    #[test]
    fn transcript_after_stop_is_ignored() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();
        capture.transcript_updated("kept");
        capture.stop_dictation().unwrap();

        assert!(!capture.transcript_updated("late result"));
        assert_eq!(capture.buffer(), "kept");
        assert_eq!(capture.mode(), CaptureMode::Text);
    }

    #[test]
    fn buffer_is_editable_after_stop() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();
        capture.transcript_updated("helo");
        capture.stop_dictation().unwrap();
        capture.edit("hello");

        assert_eq!(capture.save().unwrap(), SaveOutcome::Ready("hello".to_string()));
    }

    #[test]
    fn save_while_dictating_fails() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();
        capture.transcript_updated("text");

        let err = capture.save().unwrap_err();
        assert_eq!(err.current_mode, CaptureMode::Dictation);
        assert_eq!(capture.buffer(), "text");
    }

    #[test]
    fn only_one_dictation_at_a_time() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();
        let err = capture.start_dictation().unwrap_err();
        assert!(err.to_string().contains("start dictation"));
        assert!(err.to_string().contains("dictation"));
    }

    #[test]
    fn recognition_failure_keeps_buffer_and_halts() {
        let mut capture = Capture::new();
        capture.start_dictation().unwrap();
        capture.transcript_updated("partial");

        assert!(capture.recognition_failed());
        assert_eq!(capture.mode(), CaptureMode::Text);
        assert!(!capture.transcript_updated("more"));
        assert_eq!(capture.save().unwrap(), SaveOutcome::Ready("partial".to_string()));
    }

    #[test]
    fn recognition_failure_outside_dictation_is_ignored() {
        let mut capture = Capture::new();
        assert!(!capture.recognition_failed());
        assert_eq!(capture.mode(), CaptureMode::Onboarding);
    }

    #[test]
    fn stop_without_dictation_fails() {
        let mut capture = Capture::new();
        assert!(capture.stop_dictation().is_err());
    }

    #[test]
    fn handle_dispatches_messages() {
        let mut capture = Capture::new();
        assert_eq!(
            capture.handle(CaptureMessage::StartDictation).unwrap(),
            CaptureOutcome::Applied
        );
        capture
            .handle(CaptureMessage::TranscriptUpdated("hello".into()))
            .unwrap();
        capture.handle(CaptureMessage::StopDictation).unwrap();
        assert_eq!(
            capture
                .handle(CaptureMessage::TranscriptUpdated("stale".into()))
                .unwrap(),
            CaptureOutcome::Ignored
        );
        assert_eq!(
            capture.handle(CaptureMessage::Save).unwrap(),
            CaptureOutcome::Saved(SaveOutcome::Ready("hello".to_string()))
        );
    }

    #[test]
    fn mode_display() {
        assert_eq!(CaptureMode::Onboarding.to_string(), "onboarding");
        assert_eq!(CaptureMode::Text.to_string(), "text");
        assert_eq!(CaptureMode::Dictation.to_string(), "dictation");
    }
}
