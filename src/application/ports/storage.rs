//! Key-value storage port interface

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Invalid storage key: \"{0}\"")]
    InvalidKey(String),

    #[error("Failed to read \"{key}\": {message}")]
    ReadFailed { key: String, message: String },

    #[error("Failed to write \"{key}\": {message}")]
    WriteFailed { key: String, message: String },
}

/// Port for persistent string key-value storage.
///
/// Values are replaced whole on every write; there is no append.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Check that a key is usable by every adapter (also as a file name)
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(validate_key("notes").is_ok());
        assert!(validate_key("notes.corrupt").is_ok());
        assert!(validate_key("a-b_c1").is_ok());
    }

    #[test]
    fn invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("with space").is_err());
    }
}
