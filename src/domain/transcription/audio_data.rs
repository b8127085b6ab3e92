//! Audio data value object

use std::fmt;

/// Supported audio MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMimeType {
    #[default]
    Flac,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "audio/flac",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Encoded audio ready for transcription, plus how long it plays.
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    mime_type: AudioMimeType,
    duration_ms: u64,
}

impl AudioData {
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self {
            data,
            mime_type,
            duration_ms: 0,
        }
    }

    /// Attach the playback length of the clip
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encode the audio data as base64
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_as_str() {
        assert_eq!(AudioMimeType::Flac.as_str(), "audio/flac");
        assert_eq!(AudioMimeType::Flac.to_string(), "audio/flac");
        assert_eq!(AudioMimeType::default(), AudioMimeType::Flac);
    }

    #[test]
    fn duration_is_attached() {
        let audio = AudioData::new(vec![0u8; 10], AudioMimeType::Flac).with_duration_ms(1500);
        assert_eq!(audio.duration_ms(), 1500);
        assert_eq!(audio.size_bytes(), 10);
        assert!(!audio.is_empty());
    }

    #[test]
    fn to_base64_round_trips() {
        use base64::Engine;
        let audio = AudioData::new(vec![1, 2, 3, 4], AudioMimeType::Flac);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(audio.to_base64())
            .unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 4]);
    }
}
