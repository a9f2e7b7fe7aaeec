//! Access to the persisted bearer token.
//!
//! The store is a flat name → value map. Only `AUTHORIZATION` is used by the
//! builder; expiry is never tracked here, the server's status code decides.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CredentialError;

/// Key under which the bearer token is stored.
pub const AUTHORIZATION: &str = "Authorization";

/// A named-value store shared between the builder and the host.
pub trait CredentialStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError>;
    fn remove(&self, name: &str) -> Result<(), CredentialError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a bearer token.
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        lock(&store.values).insert(AUTHORIZATION.to_string(), token.to_string());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        lock(&self.values).insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), CredentialError> {
        lock(&self.values).remove(name);
        Ok(())
    }
}

/// JSON-file backed store, rewritten in full on every mutation.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Load `path`, treating a missing file as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let mut values = lock(&self.values);
        values.insert(name.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, name: &str) -> Result<(), CredentialError> {
        let mut values = lock(&self.values);
        if values.remove(name).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

// A panic while holding the lock cannot leave the map half-written.
fn lock(values: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    values.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(AUTHORIZATION).is_none());

        store.set(AUTHORIZATION, "abc").unwrap();
        assert_eq!(store.get(AUTHORIZATION).as_deref(), Some("abc"));

        store.remove(AUTHORIZATION).unwrap();
        assert!(store.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn memory_store_with_token() {
        let store = MemoryCredentialStore::with_token("seeded");
        assert_eq!(store.get(AUTHORIZATION).as_deref(), Some("seeded"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::open(&path).unwrap();
        assert!(store.get(AUTHORIZATION).is_none());
        store.set(AUTHORIZATION, "persisted").unwrap();
        drop(store);

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(AUTHORIZATION).as_deref(), Some("persisted"));

        reopened.remove(AUTHORIZATION).unwrap();
        let again = FileCredentialStore::open(&path).unwrap();
        assert!(again.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let err = FileCredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, CredentialError::Corrupt(_)));
    }

    #[test]
    fn file_store_remove_missing_key_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileCredentialStore::open(&path).unwrap();
        store.remove(AUTHORIZATION).unwrap();
        assert!(!path.exists());
    }
}
