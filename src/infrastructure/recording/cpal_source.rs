//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread for the
//! whole capture. The callback appends mono i16 samples to a shared buffer
//! that `snapshot`/`drain` read from the async side. `stop` joins that
//! thread, so the stream is gone before a new capture can start.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, SizedSample, StreamConfig};
use tokio::sync::{oneshot, Mutex as AsyncMutex};

use super::flac_encoder::{encode_segment, TARGET_SAMPLE_RATE};
use super::resample::{mix_to_mono, to_target_rate};
use crate::application::ports::{AudioSource, RecordingError};
use crate::domain::transcription::AudioData;

#[derive(Default)]
struct Shared {
    /// Mono samples of the current segment at the device rate
    samples: Mutex<Vec<i16>>,
    sample_rate: AtomicU32,
    recording: AtomicBool,
}

impl Shared {
    fn samples(&self) -> MutexGuard<'_, Vec<i16>> {
        self.samples.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle to a running capture thread
struct CaptureThread {
    /// Dropping this wakes the thread, which then closes the stream
    halt: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl CaptureThread {
    async fn join(self) -> Result<(), RecordingError> {
        drop(self.halt);
        let handle = self.handle;
        tokio::task::spawn_blocking(move || handle.join())
            .await
            .map_err(|e| RecordingError::RecordingFailed(format!("Join error: {}", e)))?
            .map_err(|_| RecordingError::RecordingFailed("Capture thread panicked".to_string()))
    }
}

/// Default-microphone audio source
pub struct CpalAudioSource {
    shared: Arc<Shared>,
    /// Held across start and stop so they never interleave
    capture: AsyncMutex<Option<CaptureThread>>,
}

impl CpalAudioSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            capture: AsyncMutex::new(None),
        }
    }

    fn input_device() -> Result<cpal::Device, RecordingError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(RecordingError::NoAudioDevice)
    }

    /// Pick an i16/f32 config, preferring fewer channels and one that
    /// supports 16kHz natively
    fn input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), RecordingError> {
        let supports_target = |range: &cpal::SupportedStreamConfigRange| {
            range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        };

        let range = device
            .supported_input_configs()
            .map_err(|e| RecordingError::StartFailed(format!("Failed to get configs: {}", e)))?
            .filter(|c| matches!(c.sample_format(), SampleFormat::I16 | SampleFormat::F32))
            .min_by_key(|c| (!supports_target(c), c.channels()))
            .ok_or_else(|| RecordingError::StartFailed("No suitable config found".into()))?;

        let sample_rate = if supports_target(&range) {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            range.min_sample_rate()
        };

        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, range.sample_format()))
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        shared: Arc<Shared>,
        to_i16: fn(T) -> i16,
    ) -> Result<cpal::Stream, RecordingError>
    where
        T: SizedSample + Send + 'static,
    {
        let channels = config.channels;
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if !shared.recording.load(Ordering::SeqCst) {
                        return;
                    }
                    let pcm: Vec<i16> = data.iter().map(|&s| to_i16(s)).collect();
                    shared.samples().extend(mix_to_mono(&pcm, channels));
                },
                |err| eprintln!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| RecordingError::StartFailed(e.to_string()))
    }

    /// Body of the capture thread. Reports readiness through `ready`, then
    /// keeps the stream alive until `halt` is dropped.
    fn run_capture(
        shared: Arc<Shared>,
        ready: oneshot::Sender<Result<(), RecordingError>>,
        halt: mpsc::Receiver<()>,
    ) {
        let opened = Self::input_device().and_then(|device| {
            let (config, format) = Self::input_config(&device)?;
            shared.sample_rate.store(config.sample_rate.0, Ordering::SeqCst);

            let stream = match format {
                SampleFormat::I16 => {
                    Self::build_stream::<i16>(&device, &config, Arc::clone(&shared), |s| s)
                }
                SampleFormat::F32 => Self::build_stream::<f32>(
                    &device,
                    &config,
                    Arc::clone(&shared),
                    |s| (s * 32767.0) as i16,
                ),
                other => Err(RecordingError::StartFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                ))),
            }?;

            stream
                .play()
                .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
            Ok(stream)
        });

        let stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                shared.recording.store(false, Ordering::SeqCst);
                let _ = ready.send(Err(e));
                return;
            }
        };

        let _ = ready.send(Ok(()));
        let _ = halt.recv();
        drop(stream);
    }

    /// Copy or take the current segment and encode it off the async runtime
    async fn encode_current(&self, take: bool) -> Result<Option<AudioData>, RecordingError> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }

        let samples = {
            let mut buffer = self.shared.samples();
            if take {
                std::mem::take(&mut *buffer)
            } else {
                buffer.clone()
            }
        };
        if samples.is_empty() {
            return Ok(None);
        }

        let source_rate = self.shared.sample_rate.load(Ordering::SeqCst);
        let audio = tokio::task::spawn_blocking(move || {
            let resampled = to_target_rate(&samples, source_rate)
                .map_err(RecordingError::EncodeFailed)?;
            encode_segment(&resampled).map_err(|e| RecordingError::EncodeFailed(e.to_string()))
        })
        .await
        .map_err(|e| RecordingError::EncodeFailed(format!("Encode task error: {}", e)))??;

        Ok(Some(audio))
    }
}

impl Default for CpalAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for CpalAudioSource {
    fn has_input_device(&self) -> bool {
        Self::input_device().is_ok()
    }

    async fn start(&self) -> Result<(), RecordingError> {
        let mut capture = self.capture.lock().await;
        if capture.is_some() || self.shared.recording.swap(true, Ordering::SeqCst) {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }
        self.shared.samples().clear();

        let (ready_tx, ready_rx) = oneshot::channel();
        let (halt_tx, halt_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::spawn(move || Self::run_capture(shared, ready_tx, halt_rx));
        let thread = CaptureThread {
            halt: halt_tx,
            handle,
        };

        let ready = ready_rx.await.unwrap_or_else(|_| {
            Err(RecordingError::StartFailed(
                "Capture thread exited early".to_string(),
            ))
        });

        match ready {
            Ok(()) => {
                *capture = Some(thread);
                Ok(())
            }
            Err(e) => {
                self.shared.recording.store(false, Ordering::SeqCst);
                let _ = thread.join().await;
                Err(e)
            }
        }
    }

    async fn snapshot(&self) -> Result<Option<AudioData>, RecordingError> {
        self.encode_current(false).await
    }

    async fn drain(&self) -> Result<Option<AudioData>, RecordingError> {
        self.encode_current(true).await
    }

    async fn stop(&self) -> Result<(), RecordingError> {
        let mut capture = self.capture.lock().await;
        self.shared.recording.store(false, Ordering::SeqCst);

        let joined = match capture.take() {
            Some(thread) => thread.join().await,
            None => Ok(()),
        };
        self.shared.samples().clear();
        joined
    }

    fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::SeqCst)
    }

    fn segment_ms(&self) -> u64 {
        let rate = u64::from(self.shared.sample_rate.load(Ordering::SeqCst));
        if rate == 0 {
            return 0;
        }
        self.shared.samples().len() as u64 * 1000 / rate
    }
}
