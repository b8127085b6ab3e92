//! Recognition settings value objects

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidLanguageError;

/// Default dictation language
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// A BCP 47 language tag such as `pt-BR`.
///
/// Validation is structural only: alphabetic primary subtag of 2-3 letters,
/// then optional alphanumeric subtags of 1-8 characters separated by `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, e.g. `pt` for `pt-BR`
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl FromStr for LanguageTag {
    type Err = InvalidLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidLanguageError { input: s.to_string() };
        let trimmed = s.trim().replace('_', "-");
        let mut parts = trimmed.split('-');

        let primary = parts.next().ok_or_else(err)?;
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(err());
        }

        let mut normalized = primary.to_ascii_lowercase();
        for part in parts {
            if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(err());
            }
            normalized.push('-');
            // Region subtags are conventionally uppercase (pt-BR)
            if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                normalized.push_str(&part.to_ascii_uppercase());
            } else {
                normalized.push_str(part);
            }
        }

        Ok(Self(normalized))
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration fixed at the start of a dictation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// Spoken language
    pub language: LanguageTag,
    /// Keep listening until explicitly stopped
    pub continuous: bool,
    /// Deliver in-progress results before a segment is final
    pub interim_results: bool,
    /// Alternatives requested per result
    pub max_alternatives: u8,
}

impl RecognitionSettings {
    /// Settings for a dictation session in the given language
    pub fn dictation(language: LanguageTag) -> Self {
        Self {
            language,
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::dictation(LanguageTag::default())
    }
}
