//! Capture note use case: text entry and dictation into the note store

use std::future::Future;

use thiserror::Error;

use crate::domain::capture::{Capture, CaptureError, RecognitionSettings, SaveOutcome};
use crate::domain::notes::Note;
use crate::domain::recording::Duration;

use super::note_store::{NoteStore, NoteStoreError};
use super::ports::{
    KeyValueStore, NotificationIcon, Notifier, RecognitionError, RecognitionEvent,
    SpeechRecognizer,
};

/// Title used for desktop notifications
const NOTIFY_TITLE: &str = "VoiceNotes";

/// Errors from the capture use case
#[derive(Debug, Error)]
pub enum CaptureNoteError {
    #[error("{0}")]
    Unavailable(String),

    #[error("Dictation failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Store(#[from] NoteStoreError),
}

/// Input parameters for a dictation
#[derive(Debug, Clone)]
pub struct DictateInput {
    /// Session configuration, fixed at start
    pub settings: RecognitionSettings,
    /// Stop automatically after this long
    pub max_duration: Option<Duration>,
    /// Store the transcript as a note once dictation ends
    pub save: bool,
    /// Whether to show desktop notifications
    pub enable_notify: bool,
}

impl Default for DictateInput {
    fn default() -> Self {
        Self {
            settings: RecognitionSettings::default(),
            max_duration: Some(Duration::default_max_duration()),
            save: true,
            enable_notify: false,
        }
    }
}

/// Why a dictation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user asked to stop
    Requested,
    /// The max duration elapsed
    MaxDuration,
    /// The recognizer closed the session on its own
    SessionEnded,
    /// The recognizer reported an error
    Failed,
}

/// Output from a dictation
#[derive(Debug, Clone)]
pub struct DictateOutput {
    /// Final content of the capture buffer
    pub text: String,
    /// The stored note, when one was saved
    pub note: Option<Note>,
    pub stop_reason: StopReason,
    /// Recognition error that halted the session, if any
    pub error: Option<RecognitionError>,
    /// Why the transcript could not be stored; `text` still holds it
    pub save_error: Option<NoteStoreError>,
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct DictateCallbacks {
    /// Called once the session is listening
    pub on_listening: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called with the whole buffer after each applied transcript
    pub on_transcript: Option<Box<dyn Fn(&str) + Send + Sync>>,
    /// Diagnostic channel for recognition errors
    pub on_error: Option<Box<dyn Fn(&RecognitionError) + Send + Sync>>,
    /// Called when the session has been torn down
    pub on_stopped: Option<Box<dyn Fn(StopReason) + Send + Sync>>,
}

/// Note capture use case
pub struct CaptureNoteUseCase<R, N>
where
    R: SpeechRecognizer,
    N: Notifier,
{
    recognizer: R,
    notifier: N,
}

impl<R, N> CaptureNoteUseCase<R, N>
where
    R: SpeechRecognizer,
    N: Notifier,
{
    /// Create a new use case instance
    pub fn new(recognizer: R, notifier: N) -> Self {
        Self {
            recognizer,
            notifier,
        }
    }

    /// Save typed text as a note.
    ///
    /// Empty text is a no-op and returns `Ok(None)`.
    pub async fn save_text<S: KeyValueStore>(
        &self,
        store: &mut NoteStore<S>,
        text: &str,
        enable_notify: bool,
    ) -> Result<Option<Note>, CaptureNoteError> {
        let mut capture = Capture::new();
        capture.start_editor()?;
        capture.edit(text);
        self.commit(&mut capture, store, enable_notify).await
    }

    /// Run one dictation session until `stop` resolves, the max duration
    /// elapses, the session ends or the recognizer fails.
    ///
    /// Recognition errors do not fail the call: the text gathered so far is
    /// kept (and saved when requested) and the error is reported in the
    /// output and through `on_error`. Neither do storage failures while
    /// saving: the transcript stays in `text` and the cause in `save_error`.
    pub async fn dictate<S, F>(
        &self,
        store: &mut NoteStore<S>,
        input: DictateInput,
        callbacks: DictateCallbacks,
        stop: F,
    ) -> Result<DictateOutput, CaptureNoteError>
    where
        S: KeyValueStore,
        F: Future<Output = ()> + Send,
    {
        self.recognizer
            .check_available()
            .map_err(|e| CaptureNoteError::Unavailable(e.to_string()))?;

        let mut capture = Capture::new();
        capture.start_dictation()?;

        let mut session = self.recognizer.start(input.settings.clone()).await?;

        if input.enable_notify {
            let _ = self
                .notifier
                .notify(
                    NOTIFY_TITLE,
                    &format!("Listening ({})...", input.settings.language),
                    NotificationIcon::Recording,
                )
                .await;
        }

        if let Some(ref cb) = callbacks.on_listening {
            cb();
        }

        let max_duration = input.max_duration;
        let deadline = async move {
            match max_duration {
                Some(d) => tokio::time::sleep(d.as_std()).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(stop);

        let mut error = None;
        let mut stop_reason = loop {
            tokio::select! {
                _ = &mut stop => break StopReason::Requested,
                _ = &mut deadline => break StopReason::MaxDuration,
                event = session.next_event() => match event {
                    Some(event) => {
                        if let Err(e) = apply_event(&mut capture, event, &callbacks) {
                            error = Some(e);
                            break StopReason::Failed;
                        }
                    }
                    None => break StopReason::SessionEnded,
                },
            }
        };

        // Speech recorded since the last result arrives with the stop
        for event in session.stop().await {
            if let Err(e) = apply_event(&mut capture, event, &callbacks) {
                if error.is_none() {
                    error = Some(e);
                    stop_reason = StopReason::Failed;
                }
            }
        }
        drop(session);

        if capture.is_dictating() {
            capture.stop_dictation()?;
        }

        if let Some(ref cb) = callbacks.on_stopped {
            cb(stop_reason);
        }

        let text = capture.buffer().to_string();
        let (note, save_error) = if input.save {
            match self.commit(&mut capture, store, input.enable_notify).await {
                Ok(note) => (note, None),
                Err(CaptureNoteError::Store(e)) => (None, Some(e)),
                Err(e) => return Err(e),
            }
        } else {
            (None, None)
        };

        Ok(DictateOutput {
            text,
            note,
            stop_reason,
            error,
            save_error,
        })
    }

    /// Move the capture buffer into the store
    async fn commit<S: KeyValueStore>(
        &self,
        capture: &mut Capture,
        store: &mut NoteStore<S>,
        enable_notify: bool,
    ) -> Result<Option<Note>, CaptureNoteError> {
        let content = match capture.save()? {
            SaveOutcome::Empty => return Ok(None),
            SaveOutcome::Ready(content) => content,
        };

        let note = store.add(content).await?;

        if enable_notify {
            let _ = self
                .notifier
                .notify(NOTIFY_TITLE, "Note saved!", NotificationIcon::Success)
                .await;
        }

        Ok(Some(note))
    }
}

/// Feed one recognizer event into the capture.
///
/// Returns the error when the event reports a failure; the capture then stops
/// accepting results.
fn apply_event(
    capture: &mut Capture,
    event: RecognitionEvent,
    callbacks: &DictateCallbacks,
) -> Result<(), RecognitionError> {
    match event {
        RecognitionEvent::Result(transcript) => {
            if capture.apply_transcript(&transcript) {
                if let Some(ref cb) = callbacks.on_transcript {
                    cb(capture.buffer());
                }
            }
            Ok(())
        }
        RecognitionEvent::Error(e) => {
            if let Some(ref cb) = callbacks.on_error {
                cb(&e);
            }
            capture.recognition_failed();
            Err(e)
        }
    }
}
