//! Continuous dictation built from an audio source and a batch transcriber
//!
//! Audio accumulates into a segment. Every `interim_interval` the segment so
//! far is transcribed and reported as an interim result; once it reaches
//! `segment_length` it is drained, its text becomes final and a new segment
//! starts. Every result carries the whole transcript, so a consumer can
//! simply replace what it displays.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::application::ports::{
    AudioSource, DictationSession, RecognitionError, RecognitionEvent, SpeechRecognizer,
    Transcriber,
};
use crate::domain::capture::{RecognitionSettings, Transcript, TranscriptSegment};
use crate::domain::recording::Duration;
use crate::domain::transcription::SystemPrompt;

const EVENT_BUFFER: usize = 16;

/// Segment pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTiming {
    pub interim_interval: Duration,
    pub segment_length: Duration,
}

impl Default for SegmentTiming {
    fn default() -> Self {
        Self {
            interim_interval: Duration::default_interim_interval(),
            segment_length: Duration::default_segment_length(),
        }
    }
}

/// Speech recognizer that re-transcribes the growing segment periodically
pub struct SegmentedRecognizer<A, T> {
    source: Arc<A>,
    transcriber: Option<Arc<T>>,
    timing: SegmentTiming,
}

impl<A, T> SegmentedRecognizer<A, T>
where
    A: AudioSource + 'static,
    T: Transcriber + 'static,
{
    /// `transcriber` is `None` when no API key is configured; the
    /// recognizer then reports itself unavailable.
    pub fn new(source: A, transcriber: Option<T>, timing: SegmentTiming) -> Self {
        Self {
            source: Arc::new(source),
            transcriber: transcriber.map(Arc::new),
            timing,
        }
    }
}

#[async_trait]
impl<A, T> SpeechRecognizer for SegmentedRecognizer<A, T>
where
    A: AudioSource + 'static,
    T: Transcriber + 'static,
{
    fn check_available(&self) -> Result<(), RecognitionError> {
        if self.transcriber.is_none() {
            return Err(RecognitionError::Unavailable(
                "no Gemini API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)".to_string(),
            ));
        }
        if !self.source.has_input_device() {
            return Err(RecognitionError::Unavailable(
                "no audio input device found".to_string(),
            ));
        }
        Ok(())
    }

    async fn start(
        &self,
        settings: RecognitionSettings,
    ) -> Result<Box<dyn DictationSession>, RecognitionError> {
        let transcriber = self.transcriber.clone().ok_or_else(|| {
            RecognitionError::Unavailable("no Gemini API key configured".to_string())
        })?;

        self.source
            .start()
            .await
            .map_err(|e| RecognitionError::StartFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let stop = Arc::new(Notify::new());

        let worker = SegmentWorker {
            source: Arc::clone(&self.source),
            transcriber,
            prompt: SystemPrompt::build(&settings.language),
            settings,
            timing: self.timing,
            events: tx,
            stop: Arc::clone(&stop),
        };
        let task = tokio::spawn(worker.run());

        Ok(Box::new(SegmentedSession {
            events: rx,
            stop,
            task: Some(task),
            stopped: false,
        }))
    }
}

struct SegmentWorker<A, T> {
    source: Arc<A>,
    transcriber: Arc<T>,
    prompt: SystemPrompt,
    settings: RecognitionSettings,
    timing: SegmentTiming,
    events: mpsc::Sender<RecognitionEvent>,
    stop: Arc<Notify>,
}

impl<A, T> SegmentWorker<A, T>
where
    A: AudioSource,
    T: Transcriber,
{
    async fn run(self) {
        let mut finalized: Vec<String> = Vec::new();
        let mut ticker = tokio::time::interval(self.timing.interim_interval.as_std());
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.stop.notified() => {
                    self.flush(&finalized).await;
                    break;
                }
                _ = ticker.tick() => {}
            }

            let closes_segment = self.source.segment_ms() >= self.timing.segment_length.as_millis();
            let audio = if closes_segment {
                self.source.drain().await
            } else {
                self.source.snapshot().await
            };

            let audio = match audio {
                Ok(Some(audio)) => audio,
                Ok(None) => continue,
                Err(e) => {
                    self.fail(RecognitionError::Audio(e.to_string())).await;
                    break;
                }
            };

            // A stop arriving mid-request is picked up by the next select
            let text = match self.transcriber.transcribe(&audio, &self.prompt).await {
                Ok(text) => text,
                Err(e) => {
                    self.fail(RecognitionError::Transcription(e.to_string())).await;
                    break;
                }
            };

            let current = join_segment(&finalized, &text);
            let transcript = build_transcript(&finalized, &current, closes_segment);
            if closes_segment && !current.is_empty() {
                finalized.push(current);
            }

            if (closes_segment || self.settings.interim_results)
                && self
                    .events
                    .send(RecognitionEvent::Result(transcript))
                    .await
                    .is_err()
            {
                break;
            }

            if closes_segment && !self.settings.continuous {
                break;
            }
        }

        let _ = self.source.stop().await;
    }

    /// Transcribe whatever was recorded since the last drain and deliver it
    /// as the final result
    async fn flush(&self, finalized: &[String]) {
        let audio = match self.source.drain().await {
            Ok(Some(audio)) => audio,
            Ok(None) => return,
            Err(e) => {
                self.fail(RecognitionError::Audio(e.to_string())).await;
                return;
            }
        };

        match self.transcriber.transcribe(&audio, &self.prompt).await {
            Ok(text) => {
                let current = join_segment(finalized, &text);
                let transcript = build_transcript(finalized, &current, true);
                let _ = self.events.send(RecognitionEvent::Result(transcript)).await;
            }
            Err(e) => self.fail(RecognitionError::Transcription(e.to_string())).await,
        }
    }

    async fn fail(&self, error: RecognitionError) {
        let _ = self.events.send(RecognitionEvent::Error(error)).await;
    }
}

/// Separate a segment from the text before it with a single space
fn join_segment(finalized: &[String], text: &str) -> String {
    let text = text.trim();
    if finalized.is_empty() || text.is_empty() {
        text.to_string()
    } else {
        format!(" {}", text)
    }
}

fn build_transcript(finalized: &[String], current: &str, is_final: bool) -> Transcript {
    let mut segments: Vec<TranscriptSegment> = finalized
        .iter()
        .map(|text| TranscriptSegment::finalized(text.clone()))
        .collect();

    if !current.is_empty() {
        segments.push(if is_final {
            TranscriptSegment::finalized(current)
        } else {
            TranscriptSegment::interim(current)
        });
    }

    Transcript::from_segments(segments)
}

/// Caller-owned handle to one running worker
struct SegmentedSession {
    events: mpsc::Receiver<RecognitionEvent>,
    stop: Arc<Notify>,
    task: Option<JoinHandle<()>>,
    stopped: bool,
}

#[async_trait]
impl DictationSession for SegmentedSession {
    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        if self.stopped {
            return None;
        }
        self.events.recv().await
    }

    async fn stop(&mut self) -> Vec<RecognitionEvent> {
        if self.stopped {
            return Vec::new();
        }
        self.stopped = true;
        self.stop.notify_one();

        // The worker drops its sender on exit, which ends this loop
        let mut pending = Vec::new();
        while let Some(event) = self.events.recv().await {
            pending.push(event);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        pending
    }
}

impl Drop for SegmentedSession {
    fn drop(&mut self) {
        self.stop.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{RecordingError, TranscriptionError};
    use crate::domain::transcription::{AudioData, AudioMimeType};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Source whose segment length is the time since start or last drain
    struct ClockSource {
        device: bool,
        recording: AtomicBool,
        segment_start: Mutex<Instant>,
    }

    impl ClockSource {
        fn new() -> Self {
            Self {
                device: true,
                recording: AtomicBool::new(false),
                segment_start: Mutex::new(Instant::now()),
            }
        }

        fn clip(&self) -> AudioData {
            AudioData::new(vec![0u8; 4], AudioMimeType::Flac).with_duration_ms(self.segment_ms())
        }
    }

    #[async_trait]
    impl AudioSource for ClockSource {
        fn has_input_device(&self) -> bool {
            self.device
        }

        async fn start(&self) -> Result<(), RecordingError> {
            if self.recording.swap(true, Ordering::SeqCst) {
                return Err(RecordingError::StartFailed("already recording".to_string()));
            }
            *self.segment_start.lock().unwrap() = Instant::now();
            Ok(())
        }

        async fn snapshot(&self) -> Result<Option<AudioData>, RecordingError> {
            Ok(Some(self.clip()))
        }

        async fn drain(&self) -> Result<Option<AudioData>, RecordingError> {
            let clip = self.clip();
            *self.segment_start.lock().unwrap() = Instant::now();
            Ok(Some(clip))
        }

        async fn stop(&self) -> Result<(), RecordingError> {
            self.recording.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_recording(&self) -> bool {
            self.recording.load(Ordering::SeqCst)
        }

        fn segment_ms(&self) -> u64 {
            self.segment_start.lock().unwrap().elapsed().as_millis() as u64
        }
    }

    struct ScriptedTranscriber {
        replies: Mutex<VecDeque<Result<String, TranscriptionError>>>,
    }

    impl ScriptedTranscriber {
        fn new(replies: Vec<Result<&str, TranscriptionError>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(
            &self,
            _audio: &AudioData,
            _prompt: &SystemPrompt,
        ) -> Result<String, TranscriptionError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    impl SegmentedRecognizer<ClockSource, ScriptedTranscriber> {
        fn transcriber_idle(&self) -> bool {
            self.transcriber
                .as_ref()
                .is_some_and(|t| t.replies.lock().unwrap().is_empty())
        }
    }

    fn timing() -> SegmentTiming {
        SegmentTiming {
            interim_interval: Duration::from_secs(3),
            segment_length: Duration::from_secs(5),
        }
    }

    fn recognizer(
        replies: Vec<Result<&str, TranscriptionError>>,
    ) -> SegmentedRecognizer<ClockSource, ScriptedTranscriber> {
        SegmentedRecognizer::new(
            ClockSource::new(),
            Some(ScriptedTranscriber::new(replies)),
            timing(),
        )
    }

    fn text_of(event: Option<RecognitionEvent>) -> (String, bool) {
        match event {
            Some(RecognitionEvent::Result(t)) => {
                let settled = t.segments().iter().all(|s| s.is_final);
                (t.text(), settled)
            }
            other => panic!("expected result, got {:?}", other),
        }
    }

    #[test]
    fn check_available_without_transcriber_is_unavailable() {
        let recognizer: SegmentedRecognizer<ClockSource, ScriptedTranscriber> =
            SegmentedRecognizer::new(ClockSource::new(), None, timing());
        assert!(matches!(
            recognizer.check_available(),
            Err(RecognitionError::Unavailable(_))
        ));
    }

    #[test]
    fn check_available_without_device_is_unavailable() {
        let source = ClockSource {
            device: false,
            ..ClockSource::new()
        };
        let recognizer = SegmentedRecognizer::new(source, Some(ScriptedTranscriber::new(vec![])), timing());
        assert!(matches!(
            recognizer.check_available(),
            Err(RecognitionError::Unavailable(_))
        ));
    }

    #[test]
    fn check_available_ok_with_key_and_device() {
        assert!(recognizer(vec![]).check_available().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn interim_then_final_then_next_segment() {
        let recognizer = recognizer(vec![Ok("hello"), Ok("hello world"), Ok("next")]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        assert_eq!(text_of(session.next_event().await), ("hello".to_string(), false));
        assert_eq!(
            text_of(session.next_event().await),
            ("hello world".to_string(), true)
        );
        assert_eq!(
            text_of(session.next_event().await),
            ("hello world next".to_string(), false)
        );

        let pending = session.stop().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(
            text_of(pending.into_iter().next()),
            ("hello world".to_string(), true)
        );
        assert!(session.next_event().await.is_none());
        assert!(!recognizer.source.is_recording());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_transcribes_speech_since_last_tick() {
        let recognizer = recognizer(vec![Ok("quick note")]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        let pending = session.stop().await;

        assert_eq!(pending.len(), 1);
        assert_eq!(
            text_of(pending.into_iter().next()),
            ("quick note".to_string(), true)
        );
        assert!(recognizer.transcriber_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_appends_tail_to_finalized_segments() {
        let recognizer = recognizer(vec![Ok("first"), Ok("first part"), Ok("tail")]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        session.next_event().await;
        assert_eq!(text_of(session.next_event().await).0, "first part");

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        let pending = session.stop().await;
        assert_eq!(
            text_of(pending.into_iter().last()),
            ("first part tail".to_string(), true)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tail_is_reported() {
        let recognizer = recognizer(vec![Err(TranscriptionError::RateLimited)]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        let pending = session.stop().await;
        assert!(matches!(
            pending.as_slice(),
            [RecognitionEvent::Error(RecognitionError::Transcription(_))]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_stop_returns_nothing() {
        let recognizer = recognizer(vec![Ok("once")]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        assert_eq!(session.stop().await.len(), 1);
        assert!(session.stop().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transcription_error_ends_session() {
        let recognizer = recognizer(vec![
            Ok("partial"),
            Err(TranscriptionError::RateLimited),
            Ok("never"),
        ]);
        let mut session = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        assert_eq!(text_of(session.next_event().await).0, "partial");
        assert!(matches!(
            session.next_event().await,
            Some(RecognitionEvent::Error(RecognitionError::Transcription(_)))
        ));
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn single_utterance_ends_after_first_segment() {
        let recognizer = recognizer(vec![Ok("one"), Ok("one shot")]);
        let settings = RecognitionSettings {
            continuous: false,
            ..RecognitionSettings::default()
        };
        let mut session = recognizer.start(settings).await.unwrap();

        assert_eq!(text_of(session.next_event().await).0, "one");
        assert_eq!(text_of(session.next_event().await), ("one shot".to_string(), true));
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn interim_results_can_be_suppressed() {
        let recognizer = recognizer(vec![Ok("draft"), Ok("final words")]);
        let settings = RecognitionSettings {
            interim_results: false,
            ..RecognitionSettings::default()
        };
        let mut session = recognizer.start(settings).await.unwrap();

        assert_eq!(
            text_of(session.next_event().await),
            ("final words".to_string(), true)
        );
        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn only_one_session_at_a_time() {
        let recognizer = recognizer(vec![]);
        let mut first = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();

        let second = recognizer.start(RecognitionSettings::default()).await;
        assert!(matches!(second, Err(RecognitionError::StartFailed(_))));

        first.stop().await;
        let mut third = recognizer
            .start(RecognitionSettings::default())
            .await
            .unwrap();
        third.stop().await;
    }

    #[test]
    fn later_segments_are_space_separated() {
        assert_eq!(join_segment(&[], " first "), "first");
        assert_eq!(join_segment(&["first".to_string()], "second"), " second");
        assert_eq!(join_segment(&["first".to_string()], ""), "");
    }
}
