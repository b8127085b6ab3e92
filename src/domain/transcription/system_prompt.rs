//! System prompt value object

use crate::domain::capture::LanguageTag;

/// Base instruction for dictation transcription
const BASE_INSTRUCTION: &str = r#"You are a speech recognizer used for dictating notes.

Instructions:
- Transcribe the spoken words verbatim
- Add punctuation where the speaker pauses or ends a sentence
- If the audio contains no speech, output nothing
- Output ONLY the transcribed text
- Do NOT translate, summarize, or add commentary"#;

/// System prompt sent with every transcription request.
/// Combines the base instruction with the expected spoken language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    content: String,
}

impl SystemPrompt {
    /// Build a prompt for speech in the given language
    pub fn build(language: &LanguageTag) -> Self {
        let content = format!(
            "{}\n\nSpoken language: {} (BCP 47). Write the transcript in this language.",
            BASE_INSTRUCTION, language
        );
        Self { content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::build(&LanguageTag::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_contains_base_instruction() {
        let prompt = SystemPrompt::default();
        assert!(prompt.content().contains("speech recognizer"));
        assert!(prompt.content().contains("verbatim"));
    }

    #[test]
    fn build_mentions_language() {
        let prompt = SystemPrompt::build(&"en-US".parse().unwrap());
        assert!(prompt.content().contains("Spoken language: en-US"));
    }

    #[test]
    fn default_is_pt_br() {
        assert!(SystemPrompt::default().content().contains("pt-BR"));
    }
}
