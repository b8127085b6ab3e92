//! Note entity and its identifier

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{NoteError, NoteIdParseError};

/// Number of id characters shown on note cards
pub const SHORT_ID_LEN: usize = 8;

/// Opaque, globally unique note identifier.
///
/// Freshly generated ids are UUID v4 strings, but any non-empty string read
/// back from storage is accepted so notes written by other clients survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a new random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters used to reference the note on the command line
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl FromStr for NoteId {
    type Err = NoteIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(NoteIdParseError { input: s.to_string() });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-authored text record with identity and creation time.
///
/// Serialized as `{"id": ..., "date": ..., "content": ...}`. Notes are never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord")]
pub struct Note {
    id: NoteId,
    date: DateTime<Utc>,
    content: String,
}

impl Note {
    /// Create a note with a fresh id and the current time.
    ///
    /// Fails with [`NoteError::EmptyContent`] for an empty string.
    pub fn new(content: impl Into<String>) -> Result<Self, NoteError> {
        Self::from_parts(NoteId::generate(), Utc::now(), content)
    }

    /// Create a note from explicit parts
    pub fn from_parts(
        id: NoteId,
        date: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Result<Self, NoteError> {
        let content = content.into();
        if content.is_empty() {
            return Err(NoteError::EmptyContent);
        }
        Ok(Self { id, date, content })
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Single-line preview of the content, truncated to `max_chars`
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.content.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() > max_chars {
            let head: String = flat.chars().take(max_chars).collect();
            format!("{}...", head)
        } else {
            flat
        }
    }

    /// Creation date in the local timezone, e.g. `2024-02-01`
    pub fn formatted_date(&self) -> String {
        self.date
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Unvalidated wire form of a note
#[derive(Deserialize)]
struct NoteRecord {
    id: NoteId,
    date: DateTime<Utc>,
    content: String,
}

impl TryFrom<NoteRecord> for Note {
    type Error = NoteError;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        Note::from_parts(record.id, record.date, record.content)
    }
}
