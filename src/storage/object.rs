//! Object store collaborator
//!
//! Flat string keys inside a fixed bucket; no versioning or prefixing.
//! The promoted-model slot is the only key the pipeline touches. The local
//! backend maps keys to files under a base directory; the in-memory backend
//! backs tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Object store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Byte-level access to a flat-keyed object store
pub trait ObjectStore: Send + Sync {
    /// Whether an object exists at the key
    fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Retrieve an object's bytes
    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store bytes at the key, overwriting any existing object
    fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Object store rooted in a local directory
#[derive(Debug)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

impl ObjectStore for LocalObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.key_to_path(key).exists())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.key_to_path(key);
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(std::fs::read(path)?)
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.key_to_path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&path)?;
        file.write_all(data)?;
        Ok(())
    }
}

/// In-memory object store for tests
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryObjectStore::new();
        assert!(!store.exists("model.bin").unwrap());

        store.put("model.bin", b"bytes").unwrap();
        assert!(store.exists("model.bin").unwrap());
        assert_eq!(store.get("model.bin").unwrap(), b"bytes");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_in_memory_missing_key() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(
            store.get("absent").unwrap_err(),
            StorageError::NotFound(_)
        ));
    }

    #[test]
    fn test_put_overwrites() {
        let store = InMemoryObjectStore::new();
        store.put("model.bin", b"old").unwrap();
        store.put("model.bin", b"new").unwrap();
        assert_eq!(store.get("model.bin").unwrap(), b"new");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_local_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(!store.exists("model.bin").unwrap());
        store.put("model.bin", b"payload").unwrap();
        assert!(store.exists("model.bin").unwrap());
        assert_eq!(store.get("model.bin").unwrap(), b"payload");
    }

    #[test]
    fn test_local_missing_key() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        assert!(matches!(
            store.get("absent").unwrap_err(),
            StorageError::NotFound(_)
        ));
    }
}
