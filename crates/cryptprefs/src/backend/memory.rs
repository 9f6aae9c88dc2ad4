//! [`MemoryBackend`]: process-local backend with no persistence.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{Backend, BackendError};

/// In-memory [`Backend`]. `commit` is a no-op.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Create a new, empty [`MemoryBackend`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Return `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of every raw `(key, value)` pair, in key order.
    pub fn raw_entries(&self) -> Vec<(String, String)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.entries.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        self.entries.write().clear();
        Ok(())
    }

    fn commit(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initially_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        assert_eq!(backend.get("k").unwrap(), None);
        assert!(!backend.contains("k").unwrap());
    }

    #[test]
    fn put_get_replace() {
        let backend = MemoryBackend::new();
        backend.put("k", "v1").unwrap();
        backend.put("k", "v2").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn remove_absent_key_is_ok() {
        let backend = MemoryBackend::new();
        assert!(backend.remove("missing").is_ok());
    }

    #[test]
    fn clear_all_wipes_everything() {
        let backend = MemoryBackend::new();
        backend.put("a", "1").unwrap();
        backend.put("b", "2").unwrap();
        backend.clear_all().unwrap();
        assert!(backend.is_empty());
    }
}
