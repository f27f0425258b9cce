//! Persistent client storage
//!
//! A small string key-value contract. The storefront writes three keys: the
//! session JSON, the login timer flag and the placeholder user registry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::SessionError;

/// Session JSON for the signed-in user
pub const USER_DETAIL_KEY: &str = "LennyUserDetail";
/// `"false"` after a login, `"true"` after a logout
pub const LOGIN_TIMER_KEY: &str = "LoginTimer";
/// Placeholder email registry (JSON array)
pub const REGISTERED_USERS_KEY: &str = "registeredUsers";

/// String key-value storage that survives between visits
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// In-process storage, one per visitor
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.read().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk
///
/// Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        log::debug!("Opened client store at {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.read().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(LOGIN_TIMER_KEY).unwrap(), None);

        store.set(LOGIN_TIMER_KEY, "false").unwrap();
        assert_eq!(store.get(LOGIN_TIMER_KEY).unwrap().as_deref(), Some("false"));

        store.set(LOGIN_TIMER_KEY, "true").unwrap();
        assert_eq!(store.get(LOGIN_TIMER_KEY).unwrap().as_deref(), Some("true"));

        store.remove(LOGIN_TIMER_KEY).unwrap();
        assert_eq!(store.get(LOGIN_TIMER_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("client_store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set(USER_DETAIL_KEY, r#"{"_id":"google_1"}"#).unwrap();
            store.set(LOGIN_TIMER_KEY, "false").unwrap();
            store.remove(LOGIN_TIMER_KEY).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(USER_DETAIL_KEY).unwrap().as_deref(),
            Some(r#"{"_id":"google_1"}"#)
        );
        assert_eq!(reopened.get(LOGIN_TIMER_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("client_store.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(SessionError::Serialization(_))));
    }
}
