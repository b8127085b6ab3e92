//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration: \"{input}\". Use a positive amount with units h, m, s or ms (e.g., 30s, 2m, 1m30s, 1500ms)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a language tag is not a well-formed BCP 47 tag
#[derive(Debug, Clone, Error)]
#[error("Invalid language tag: \"{input}\". Expected a tag like pt-BR, en-US or de")]
pub struct InvalidLanguageError {
    pub input: String,
}

/// Error when a note id cannot be parsed
#[derive(Debug, Clone, Error)]
#[error("Invalid note id: \"{input}\"")]
pub struct NoteIdParseError {
    pub input: String,
}

/// Errors raised by note lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("Note content is empty")]
    EmptyContent,

    #[error("No note matches id \"{0}\"")]
    NotFound(String),

    #[error("Id prefix \"{prefix}\" matches {count} notes. Use more characters")]
    AmbiguousId { prefix: String, count: usize },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
