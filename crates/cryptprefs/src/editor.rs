//! [`BatchEditor`]: staged, encrypted mutations of the store.
//!
//! Keys and values are encrypted as soon as an edit is recorded. What happens
//! next depends on the [`CommitPolicy`]:
//!
//! - [`CommitPolicy::WriteThrough`]: each edit is written and committed to the
//!   backend before the call returns.
//! - [`CommitPolicy::Deferred`]: edits are queued and written, in order, by
//!   [`BatchEditor::apply`], followed by a single commit. Dropping the editor
//!   without applying discards the queue.
//!
//! An edit whose key or value cannot be encrypted is dropped and never reaches
//! the backend. `clear` wipes every entry in the backend, including entries
//! written by other editors and other handles sharing the backend.
//!
//! Concurrent editors on one handle are serialised per backend write. A
//! `clear` racing a `put` from another editor resolves to whichever write
//! lands last.

use common::{PrefValue, StoreError};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendError};
use crate::store::CryptoStore;

/// When edits recorded on a [`BatchEditor`] reach the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Write and commit each edit immediately.
    #[default]
    WriteThrough,
    /// Queue edits until [`BatchEditor::apply`].
    Deferred,
}

/// A recorded mutation. Keys and values are already encrypted and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit {
    /// Store `value` under `key`.
    Put { key: String, value: String },
    /// Delete `key` if present.
    Remove { key: String },
    /// Delete every entry in the backend.
    Clear,
}

/// Collects put/remove/clear intents against one [`CryptoStore`].
#[must_use = "a deferred editor discards its edits unless `apply` is called"]
pub struct BatchEditor<'a> {
    store: &'a CryptoStore,
    policy: CommitPolicy,
    pending: Vec<PendingEdit>,
    written: usize,
    failure: Option<BackendError>,
}

impl<'a> BatchEditor<'a> {
    pub(crate) fn new(store: &'a CryptoStore, policy: CommitPolicy) -> Self {
        Self {
            store,
            policy,
            pending: Vec::new(),
            written: 0,
            failure: None,
        }
    }

    /// Set `key` to `value`.
    pub fn put<T: PrefValue>(&mut self, key: &str, value: T) -> &mut Self {
        let text = value.to_text();
        let (Some(enc_key), Some(enc_value)) =
            (self.store.encrypt_text(key), self.store.encrypt_text(&text))
        else {
            warn!(kind = %T::KIND, "put dropped: key or value could not be encrypted");
            return self;
        };
        if self.store.is_debug() {
            debug!(
                encrypted_key = %enc_key,
                encrypted_value = %enc_value,
                kind = %T::KIND,
                "put"
            );
        }
        #[cfg(feature = "log-plaintext")]
        if self.store.is_debug() {
            debug!(key = %key, value = %text, "put plaintext");
        }
        self.record(PendingEdit::Put {
            key: enc_key,
            value: enc_value,
        })
    }

    /// Set `key` to a text value.
    pub fn put_string(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.put(key, value.into())
    }

    /// Set `key` to an `i32`.
    pub fn put_i32(&mut self, key: &str, value: i32) -> &mut Self {
        self.put(key, value)
    }

    /// Set `key` to an `i64`.
    pub fn put_i64(&mut self, key: &str, value: i64) -> &mut Self {
        self.put(key, value)
    }

    /// Set `key` to an `f32`.
    pub fn put_f32(&mut self, key: &str, value: f32) -> &mut Self {
        self.put(key, value)
    }

    /// Set `key` to a `bool`.
    pub fn put_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.put(key, value)
    }

    /// Delete `key`. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        let Some(enc_key) = self.store.encrypt_text(key) else {
            warn!("remove dropped: key could not be encrypted");
            return self;
        };
        if self.store.is_debug() {
            debug!(encrypted_key = %enc_key, "remove");
        }
        self.record(PendingEdit::Remove { key: enc_key })
    }

    /// Delete every entry in the backend.
    pub fn clear(&mut self) -> &mut Self {
        if self.store.is_debug() {
            debug!("clear: wiping all entries");
        }
        self.record(PendingEdit::Clear)
    }

    /// Edits queued and not yet applied. Always empty in write-through mode.
    pub fn pending(&self) -> &[PendingEdit] {
        &self.pending
    }

    /// The policy this editor was created with.
    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Write any queued edits and return how many edits reached the backend.
    ///
    /// In deferred mode the queue is replayed in recording order under a
    /// single commit. In write-through mode the edits were already written;
    /// this reports the first backend failure seen while writing them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend rejected a write or the
    /// commit.
    pub fn apply(mut self) -> Result<usize, StoreError> {
        if let Some(e) = self.failure.take() {
            return Err(StoreError::Backend(e.to_string()));
        }
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(self.written);
        }

        let backend = self.store.backend();
        let _guard = self.store.lock_writes();
        for edit in &pending {
            write_edit(backend, edit).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        backend
            .commit()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if self.store.is_debug() {
            debug!(edits = pending.len(), "deferred edits applied");
        }
        Ok(self.written + pending.len())
    }

    fn record(&mut self, edit: PendingEdit) -> &mut Self {
        match self.policy {
            CommitPolicy::Deferred => self.pending.push(edit),
            CommitPolicy::WriteThrough => {
                let backend = self.store.backend();
                let result = {
                    let _guard = self.store.lock_writes();
                    write_edit(backend, &edit).and_then(|()| backend.commit())
                };
                match result {
                    Ok(()) => self.written += 1,
                    Err(e) => {
                        warn!(error = %e, "write-through edit failed");
                        self.failure.get_or_insert(e);
                    }
                }
            }
        }
        self
    }
}

impl Drop for BatchEditor<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!(
                discarded = self.pending.len(),
                "deferred editor dropped without apply"
            );
        }
    }
}

impl std::fmt::Debug for BatchEditor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEditor")
            .field("policy", &self.policy)
            .field("pending", &self.pending.len())
            .field("written", &self.written)
            .finish()
    }
}

fn write_edit(backend: &dyn Backend, edit: &PendingEdit) -> Result<(), BackendError> {
    match edit {
        PendingEdit::Put { key, value } => backend.put(key, value),
        PendingEdit::Remove { key } => {
            if backend.contains(key)? {
                backend.remove(key)?;
            }
            Ok(())
        }
        PendingEdit::Clear => backend.clear_all(),
    }
}
