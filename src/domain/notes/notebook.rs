//! Notebook entity: the ordered note sequence and its transitions
//!
//! The notebook itself never touches storage. Commands are applied to it and
//! the resulting event tells the caller whether anything changed and needs
//! to be mirrored.

use crate::domain::error::NoteError;

use super::note::{Note, NoteId};
use super::search::SearchQuery;

/// Commands accepted by the notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteCommand {
    /// Prepend a new note
    AddNote(Note),
    /// Remove the note with this id
    RemoveNote(NoteId),
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    Added(Note),
    Removed(Note),
    /// Nothing changed (e.g. removing an unknown id)
    Unchanged,
}

impl NoteEvent {
    /// Whether the sequence changed and must be persisted
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Ordered note sequence, newest first by insertion.
///
/// Order is defined by insertion alone. Loading a sequence keeps it as given,
/// there is no sort by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notebook {
    notes: Vec<Note>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing sequence, keeping its order
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Apply a command and report what happened
    pub fn apply(&mut self, command: NoteCommand) -> NoteEvent {
        match command {
            NoteCommand::AddNote(note) => {
                self.notes.insert(0, note.clone());
                NoteEvent::Added(note)
            }
            NoteCommand::RemoveNote(id) => match self.notes.iter().position(|n| n.id() == &id) {
                Some(index) => NoteEvent::Removed(self.notes.remove(index)),
                None => NoteEvent::Unchanged,
            },
        }
    }

    /// Resolve a full id or a unique id prefix to a note
    pub fn resolve(&self, reference: &str) -> Result<&Note, NoteError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(NoteError::NotFound(reference.to_string()));
        }

        if let Some(note) = self.notes.iter().find(|n| n.id().as_str() == reference) {
            return Ok(note);
        }

        let mut matches = self
            .notes
            .iter()
            .filter(|n| n.id().as_str().starts_with(reference));

        match (matches.next(), matches.count()) {
            (None, _) => Err(NoteError::NotFound(reference.to_string())),
            (Some(note), 0) => Ok(note),
            (Some(_), rest) => Err(NoteError::AmbiguousId {
                prefix: reference.to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Filtered view for display
    pub fn search(&self, query: &SearchQuery) -> Vec<&Note> {
        query.filter(&self.notes)
    }
}
