//! Recording infrastructure module
//!
//! Captures the default microphone with cpal and hands out segments as
//! 16kHz mono FLAC, the format sent to Gemini.

mod cpal_source;
mod flac_encoder;
mod resample;

pub use cpal_source::CpalAudioSource;
pub use flac_encoder::{encode_flac, encode_segment, EncodingError, TARGET_SAMPLE_RATE};
