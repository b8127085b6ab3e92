//! VoiceNotes - a terminal note-taking tool with dictation
//!
//! Notes are typed or dictated, kept newest-first in a local JSON store and
//! found again with a case-insensitive substring search. Dictation records
//! the microphone and transcribes it with Google Gemini while you speak.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Notes, the notebook, search, the capture state machine,
//!   value objects and errors
//! - **Application**: Use cases (note store, capture) and port interfaces
//! - **Infrastructure**: Adapter implementations (file storage, cpal, Gemini,
//!   notifications, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and stop handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
