//! File-backed key-value store

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{validate_key, KeyValueStore, StorageError};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated value behind.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let write_err = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).await.map_err(write_err)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await.map_err(write_err)?;
        fs::rename(&tmp, &path).await.map_err(write_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_uses_json_extension() {
        let store = FileKeyValueStore::new("/data/voice-notes");
        assert_eq!(
            store.path_for("notes").unwrap(),
            PathBuf::from("/data/voice-notes/notes.json")
        );
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert_eq!(store.get("notes").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        store.set("notes", "[1]").await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("nested/notes.json")).unwrap();
        assert_eq!(on_disk, "[1]");
        assert_eq!(store.get("notes").await.unwrap(), Some("[1]".to_string()));
        assert!(!dir.path().join("nested/notes.json.tmp").exists());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("notes", "first").await.unwrap();
        store.set("notes", "second").await.unwrap();
        assert_eq!(store.get("notes").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(matches!(
            store.get("a/b").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
