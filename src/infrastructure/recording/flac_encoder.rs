//! FLAC encoding of speech segments
//!
//! Segments are sent to Gemini as 16kHz mono 16-bit FLAC: lossless, and
//! small enough to re-upload the in-progress segment every few seconds.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::domain::transcription::{AudioData, AudioMimeType};

/// Sample rate every segment is converted to before encoding
pub const TARGET_SAMPLE_RATE: u32 = 16000;

const BITS_PER_SAMPLE: usize = 16;
const CHANNELS: usize = 1;

/// FLAC encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("FLAC config error: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("FLAC write failed: {0}")]
    Write(String),
}

/// Encode mono 16kHz samples into a FLAC stream
pub fn encode_flac(samples: &[i16]) -> Result<Vec<u8>, EncodingError> {
    let widened: Vec<i32> = samples.iter().map(|&s| i32::from(s)).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(
        &widened,
        CHANNELS,
        BITS_PER_SAMPLE,
        TARGET_SAMPLE_RATE as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(sink.into_inner())
}

/// Encode a 16kHz segment as [`AudioData`] carrying its playback length
pub fn encode_segment(samples: &[i16]) -> Result<AudioData, EncodingError> {
    let bytes = encode_flac(samples)?;
    let duration_ms = samples.len() as u64 * 1000 / u64::from(TARGET_SAMPLE_RATE);
    Ok(AudioData::new(bytes, AudioMimeType::Flac).with_duration_ms(duration_ms))
}
