//! [`FileBackend`]: one JSON document per namespace on the local filesystem.
//!
//! Entries are loaded when the backend is opened and mutated in memory.
//! [`Backend::commit`] writes the whole document to a temporary file in the
//! same directory and renames it over the target, so a crash mid-write leaves
//! either the old or the new document, never a torn one.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{Backend, BackendError};

#[derive(Debug, Default)]
struct FileState {
    entries: BTreeMap<String, String>,
    dirty: bool,
}

/// File-backed [`Backend`] storing `<dir>/<namespace>.json`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileBackend {
    /// Open (or create) the store for `namespace` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidNamespace`] if `namespace` is empty or
    /// contains path separators, and an I/O or serialisation error if an
    /// existing document cannot be read.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, BackendError> {
        validate_namespace(namespace)?;
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{namespace}.json"));

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "file backend opened");

        Ok(Self {
            dir,
            path,
            state: RwLock::new(FileState {
                entries,
                dirty: false,
            }),
        })
    }

    /// Path of the JSON document backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn validate_namespace(namespace: &str) -> Result<(), BackendError> {
    let bad = namespace.trim().is_empty()
        || namespace.contains(['/', '\\'])
        || namespace == "."
        || namespace == "..";
    if bad {
        return Err(BackendError::InvalidNamespace(namespace.to_owned()));
    }
    Ok(())
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.state.read().entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut state = self.state.write();
        state.entries.insert(key.to_owned(), value.to_owned());
        state.dirty = true;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        let mut state = self.state.write();
        if state.entries.remove(key).is_some() {
            state.dirty = true;
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.state.read().entries.contains_key(key))
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        let mut state = self.state.write();
        if !state.entries.is_empty() {
            state.entries.clear();
            state.dirty = true;
        }
        Ok(())
    }

    fn commit(&self) -> Result<(), BackendError> {
        let mut state = self.state.write();
        if !state.dirty {
            return Ok(());
        }
        let doc = serde_json::to_vec_pretty(&state.entries)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&doc)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        state.dirty = false;
        debug!(path = %self.path.display(), entries = state.entries.len(), "file backend committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncommitted_writes_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = FileBackend::open(dir.path(), "prefs").unwrap();
            backend.put("k", "v").unwrap();
        }
        let reopened = FileBackend::open(dir.path(), "prefs").unwrap();
        assert_eq!(reopened.get("k").unwrap(), None);
    }

    #[test]
    fn committed_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = FileBackend::open(dir.path(), "prefs").unwrap();
            backend.put("k", "v").unwrap();
            backend.commit().unwrap();
        }
        let reopened = FileBackend::open(dir.path(), "prefs").unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
        assert!(reopened.path().ends_with("prefs.json"));
    }

    #[test]
    fn namespaces_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileBackend::open(dir.path(), "a").unwrap();
        let b = FileBackend::open(dir.path(), "b").unwrap();
        a.put("k", "v").unwrap();
        a.commit().unwrap();
        assert!(!b.contains("k").unwrap());
    }

    #[test]
    fn clear_all_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path(), "prefs").unwrap();
        backend.put("k", "v").unwrap();
        backend.commit().unwrap();
        backend.clear_all().unwrap();
        backend.commit().unwrap();
        let reopened = FileBackend::open(dir.path(), "prefs").unwrap();
        assert!(!reopened.contains("k").unwrap());
    }

    #[test]
    fn rejects_path_like_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        for ns in ["", "  ", "../escape", "a/b", "..", "a\\b"] {
            assert!(matches!(
                FileBackend::open(dir.path(), ns),
                Err(BackendError::InvalidNamespace(_))
            ));
        }
    }

    #[test]
    fn corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("prefs.json"), "{not json").unwrap();
        assert!(matches!(
            FileBackend::open(dir.path(), "prefs"),
            Err(BackendError::Serialization(_))
        ));
    }
}
