//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod capture_note;
pub mod note_store;
pub mod ports;

pub use capture_note::{
    CaptureNoteError, CaptureNoteUseCase, DictateCallbacks, DictateInput, DictateOutput,
    StopReason,
};
pub use note_store::{
    corrupt_backup_key, LoadOutcome, NoteStore, NoteStoreError, CORRUPT_BACKUP_PREFIX, NOTES_KEY,
};
