//! Note store use case: the notebook plus its persistence mirror

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::error::NoteError;
use crate::domain::notes::{Note, NoteCommand, NoteEvent, NoteId, Notebook, SearchQuery};

use super::ports::{KeyValueStore, StorageError};

/// Storage key holding the serialized note sequence
pub const NOTES_KEY: &str = "notes";

/// Prefix of the keys receiving unreadable note data
pub const CORRUPT_BACKUP_PREFIX: &str = "notes.corrupt";

/// Backup key for unreadable data found at `at`, e.g.
/// `notes.corrupt-20240201T120000123Z`
pub fn corrupt_backup_key(at: DateTime<Utc>) -> String {
    format!("{}-{}", CORRUPT_BACKUP_PREFIX, at.format("%Y%m%dT%H%M%S%3fZ"))
}

/// Errors from note store operations
#[derive(Debug, Clone, Error)]
pub enum NoteStoreError {
    #[error(transparent)]
    Note(#[from] NoteError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize notes: {0}")]
    Serialize(String),
}

/// What `load` found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet (absent or blank value)
    Missing,
    /// Stored sequence read successfully
    Loaded(usize),
    /// Some records were unreadable and left out. The raw value was copied to
    /// `backup_key` and the readable notes written back.
    Partial {
        loaded: usize,
        skipped: usize,
        backup_key: String,
    },
    /// Stored value is not a note sequence at all. The store starts empty;
    /// the raw value was copied to `backup_key`.
    Corrupt { reason: String, backup_key: String },
}

/// Ordered note collection mirrored to a key-value store.
///
/// Every mutation rewrites the full sequence under [`NOTES_KEY`] before it
/// becomes visible in memory, so a failed write leaves the store unchanged.
pub struct NoteStore<S: KeyValueStore> {
    notebook: Notebook,
    storage: S,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Read the persisted sequence.
    ///
    /// Absent or blank data yields an empty store. Unreadable data is moved
    /// to a fresh backup key once, so later loads see a clean sequence. Only
    /// storage I/O failures are errors.
    pub async fn load(storage: S) -> Result<(Self, LoadOutcome), NoteStoreError> {
        let raw = match storage.get(NOTES_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok((Self::with_notes(Vec::new(), storage), LoadOutcome::Missing)),
        };

        match parse_notes(&raw) {
            Ok((notes, 0)) => {
                let count = notes.len();
                Ok((Self::with_notes(notes, storage), LoadOutcome::Loaded(count)))
            }
            Ok((notes, skipped)) => {
                let store = Self::with_notes(notes, storage);
                let backup_key = store.quarantine(&raw).await?;
                let outcome = LoadOutcome::Partial {
                    loaded: store.len(),
                    skipped,
                    backup_key,
                };
                Ok((store, outcome))
            }
            Err(e) => {
                let store = Self::with_notes(Vec::new(), storage);
                let backup_key = store.quarantine(&raw).await?;
                let outcome = LoadOutcome::Corrupt {
                    reason: e.to_string(),
                    backup_key,
                };
                Ok((store, outcome))
            }
        }
    }

    fn with_notes(notes: Vec<Note>, storage: S) -> Self {
        Self {
            notebook: Notebook::from_notes(notes),
            storage,
        }
    }

    /// Copy `raw` to a new backup key, then replace it with what was readable
    async fn quarantine(&self, raw: &str) -> Result<String, NoteStoreError> {
        let backup_key = corrupt_backup_key(Utc::now());
        self.storage.set(&backup_key, raw).await?;
        self.write(&self.notebook).await?;
        Ok(backup_key)
    }

    /// Storage backend the store mirrors to
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All notes, newest first
    pub fn notes(&self) -> &[Note] {
        self.notebook.notes()
    }

    pub fn len(&self) -> usize {
        self.notebook.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notebook.is_empty()
    }

    /// Notes whose content matches the query, in store order
    pub fn search(&self, query: &SearchQuery) -> Vec<&Note> {
        self.notebook.search(query)
    }

    /// Look up a note by full id or unique id prefix
    pub fn resolve(&self, reference: &str) -> Result<&Note, NoteError> {
        self.notebook.resolve(reference)
    }

    /// Create a note from `content`, prepend it and persist.
    ///
    /// Empty content is rejected and leaves the store unchanged.
    pub async fn add(&mut self, content: impl Into<String>) -> Result<Note, NoteStoreError> {
        let note = Note::new(content)?;
        match self.dispatch(NoteCommand::AddNote(note)).await? {
            NoteEvent::Added(note) => Ok(note),
            other => unreachable!("add produced {:?}", other),
        }
    }

    /// Remove the note with `id` and persist.
    ///
    /// Returns `None` (and writes nothing) when no note has that id.
    pub async fn remove(&mut self, id: &NoteId) -> Result<Option<Note>, NoteStoreError> {
        match self.dispatch(NoteCommand::RemoveNote(id.clone())).await? {
            NoteEvent::Removed(note) => Ok(Some(note)),
            _ => Ok(None),
        }
    }

    /// Apply a command, mirroring the new sequence to storage if it changed
    pub async fn dispatch(&mut self, command: NoteCommand) -> Result<NoteEvent, NoteStoreError> {
        let mut next = self.notebook.clone();
        let event = next.apply(command);

        if event.is_change() {
            self.write(&next).await?;
            self.notebook = next;
        }

        Ok(event)
    }

    /// Consume the store, returning its storage backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    async fn write(&self, notebook: &Notebook) -> Result<(), NoteStoreError> {
        let json = serde_json::to_string(notebook.notes())
            .map_err(|e| NoteStoreError::Serialize(e.to_string()))?;
        self.storage.set(NOTES_KEY, &json).await?;
        Ok(())
    }
}

/// Parse a stored sequence record by record.
///
/// Returns the readable notes and how many records were dropped. Fails only
/// when the value is not a JSON array.
fn parse_notes(raw: &str) -> Result<(Vec<Note>, usize), serde_json::Error> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let total = records.len();
    let notes: Vec<Note> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();
    let skipped = total - notes.len();
    Ok((notes, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use async_trait::async_trait;

    async fn empty_store() -> NoteStore<MemoryKeyValueStore> {
        NoteStore::load(MemoryKeyValueStore::new()).await.unwrap().0
    }

    fn contents<S: KeyValueStore>(store: &NoteStore<S>) -> Vec<String> {
        store.notes().iter().map(|n| n.content().to_string()).collect()
    }

    #[tokio::test]
    async fn load_missing_is_empty() {
        let (store, outcome) = NoteStore::load(MemoryKeyValueStore::new()).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(outcome, LoadOutcome::Missing);
    }

    #[tokio::test]
    async fn load_blank_is_empty() {
        let storage = MemoryKeyValueStore::with_entries([(NOTES_KEY, "  ")]);
        let (store, outcome) = NoteStore::load(storage).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(outcome, LoadOutcome::Missing);
    }

    #[tokio::test]
    async fn load_corrupt_is_empty_and_backed_up() {
        let storage = MemoryKeyValueStore::with_entries([(NOTES_KEY, "{not json")]);
        let (store, outcome) = NoteStore::load(storage).await.unwrap();

        assert!(store.is_empty());
        let LoadOutcome::Corrupt { backup_key, .. } = outcome else {
            panic!("expected corrupt outcome, got {:?}", outcome);
        };
        assert!(backup_key.starts_with("notes.corrupt-"));

        let storage = store.into_storage();
        assert_eq!(
            storage.get(&backup_key).await.unwrap(),
            Some("{not json".to_string())
        );
        assert_eq!(storage.get(NOTES_KEY).await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn corrupt_data_is_backed_up_only_once() {
        let storage = MemoryKeyValueStore::with_entries([(NOTES_KEY, "{not json")]);
        let (store, _) = NoteStore::load(storage).await.unwrap();

        let (store, outcome) = NoteStore::load(store.into_storage()).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(0));

        let backups: Vec<String> = store
            .storage()
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(CORRUPT_BACKUP_PREFIX))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[tokio::test]
    async fn invalid_record_is_skipped_not_fatal() {
        let json = r#"[
            {"id":"b","date":"2024-02-02T10:00:00.000Z","content":""},
            {"id":"a","date":"2024-02-01T10:00:00.000Z","content":"kept"}
        ]"#;
        let storage = MemoryKeyValueStore::with_entries([(NOTES_KEY, json)]);
        let (store, outcome) = NoteStore::load(storage).await.unwrap();

        assert_eq!(contents(&store), vec!["kept"]);
        let LoadOutcome::Partial {
            loaded,
            skipped,
            backup_key,
        } = outcome
        else {
            panic!("expected partial outcome, got {:?}", outcome);
        };
        assert_eq!((loaded, skipped), (1, 1));

        let storage = store.into_storage();
        assert_eq!(storage.get(&backup_key).await.unwrap(), Some(json.to_string()));

        let (reloaded, outcome) = NoteStore::load(storage).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(contents(&reloaded), vec!["kept"]);
    }

    #[test]
    fn backup_key_is_a_valid_storage_key() {
        let at = "2024-02-01T12:00:00.123Z".parse::<DateTime<Utc>>().unwrap();
        let key = corrupt_backup_key(at);
        assert_eq!(key, "notes.corrupt-20240201T120000123Z");
        assert!(crate::application::ports::validate_key(&key).is_ok());
    }

    #[tokio::test]
    async fn load_browser_written_notes() {
        let json = r#"[
            {"id":"b","date":"2024-02-02T10:00:00.000Z","content":"newer"},
            {"id":"a","date":"2024-02-01T10:00:00.000Z","content":"older"}
        ]"#;
        let storage = MemoryKeyValueStore::with_entries([(NOTES_KEY, json)]);
        let (store, outcome) = NoteStore::load(storage).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Loaded(2));
        assert_eq!(contents(&store), vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn add_prepends_and_persists() {
        let mut store = empty_store().await;
        store.add("first").await.unwrap();
        let second = store.add("second").await.unwrap();

        assert_eq!(contents(&store), vec!["second", "first"]);
        assert_eq!(store.notes()[0].id(), second.id());

        let raw = store.storage.get(NOTES_KEY).await.unwrap().unwrap();
        let persisted: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.notes());
    }

    #[tokio::test]
    async fn add_empty_is_rejected() {
        let mut store = empty_store().await;
        store.add("keep").await.unwrap();

        let err = store.add("").await.unwrap_err();
        assert!(matches!(err, NoteStoreError::Note(NoteError::EmptyContent)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn remove_rewrites_storage() {
        let mut store = empty_store().await;
        let a = store.add("a").await.unwrap();
        store.add("b").await.unwrap();

        let removed = store.remove(a.id()).await.unwrap();
        assert_eq!(removed.unwrap().content(), "a");
        assert_eq!(contents(&store), vec!["b"]);

        let raw = store.storage.get(NOTES_KEY).await.unwrap().unwrap();
        let persisted: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn remove_unknown_leaves_sequence() {
        let mut store = empty_store().await;
        store.add("a").await.unwrap();
        let before = store.notes().to_vec();

        let removed = store.remove(&"missing".parse().unwrap()).await.unwrap();
        assert!(removed.is_none());
        assert_eq!(store.notes(), before.as_slice());
    }

    #[tokio::test]
    async fn reload_round_trip() {
        let mut store = empty_store().await;
        let a = store.add("alpha").await.unwrap();
        store.add("beta").await.unwrap();
        store.add("gamma").await.unwrap();
        store.remove(a.id()).await.unwrap();
        let expected = store.notes().to_vec();

        let (reloaded, outcome) = NoteStore::load(store.into_storage()).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(2));
        assert_eq!(reloaded.notes(), expected.as_slice());
    }

    #[tokio::test]
    async fn search_over_store() {
        let mut store = empty_store().await;
        store.add("zzAbCzz").await.unwrap();
        store.add("xyz").await.unwrap();
        store.add("ABCd").await.unwrap();

        let found: Vec<&str> = store
            .search(&SearchQuery::new("abc"))
            .iter()
            .map(|n| n.content())
            .collect();
        assert_eq!(found, vec!["ABCd", "zzAbCzz"]);
    }

    struct FailingWrites;

    #[async_trait]
    impl KeyValueStore for FailingWrites {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "disk full".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let (mut store, _) = NoteStore::load(FailingWrites).await.unwrap();

        let err = store.add("lost").await.unwrap_err();
        assert!(matches!(err, NoteStoreError::Storage(_)));
        assert!(store.is_empty());
    }
}
