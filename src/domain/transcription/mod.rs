//! Transcription domain module

mod audio_data;
mod system_prompt;

pub use audio_data::{AudioData, AudioMimeType};
pub use system_prompt::SystemPrompt;
