//! Notes domain module

mod note;
mod notebook;
mod search;

pub use note::{Note, NoteId, SHORT_ID_LEN};
pub use notebook::{NoteCommand, NoteEvent, Notebook};
pub use search::SearchQuery;
