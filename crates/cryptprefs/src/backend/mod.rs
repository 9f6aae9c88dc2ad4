//! Persistent string-to-string storage the encrypted store sits on.
//!
//! A [`Backend`] knows nothing about encryption: it stores whatever encoded
//! key/value text it is handed. Writes become durable on [`Backend::commit`];
//! backends without a separate durability step treat it as a no-op.

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use thiserror::Error;

/// Errors produced by a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Reading or writing the underlying storage failed.
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be parsed or serialised.
    #[error("backend serialisation error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The namespace cannot be used to name a store.
    #[error("invalid namespace: {0:?}")]
    InvalidNamespace(String),
}

/// A mapping from text to text.
///
/// Implementations use interior mutability so a single backend can be shared
/// behind an `Arc` by every handle and editor that writes to it.
pub trait Backend: Send + Sync {
    /// Return the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Return `true` if `key` is present.
    fn contains(&self, key: &str) -> Result<bool, BackendError>;

    /// Delete every entry.
    fn clear_all(&self) -> Result<(), BackendError>;

    /// Make all preceding writes durable.
    fn commit(&self) -> Result<(), BackendError>;
}
