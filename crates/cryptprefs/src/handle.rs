//! [`PrefStore`]: the caller-owned store handle.
//!
//! One handle per backend and secret pairing. Share it by reference, or wrap
//! it in an `Arc` to share across threads; there is no global instance.

use common::{PrefValue, StoreError};
use tracing::info;

use crate::config::{StoreConfig, StoreConfigBuilder};
use crate::crypto::CipherKey;
use crate::editor::{BatchEditor, CommitPolicy};
use crate::store::CryptoStore;

/// An encrypted, typed preference store.
#[derive(Debug)]
pub struct PrefStore {
    crypto: CryptoStore,
    namespace: String,
    commit_policy: CommitPolicy,
}

impl PrefStore {
    /// Start building the configuration for a new handle.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfig::builder()
    }

    /// Build a handle from a frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if no cipher key can be derived.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let explicit_secret = config.has_explicit_secret();
        let key = match config.secret.as_deref() {
            Some(secret) if !secret.is_empty() => CipherKey::from_secret(secret),
            _ => CipherKey::for_namespace(&config.namespace),
        }
        .map_err(|e| StoreError::InvalidKey(e.to_string()))?;

        info!(
            namespace = %config.namespace,
            explicit_secret,
            commit_policy = ?config.commit_policy,
            "preference store opened"
        );

        Ok(Self {
            crypto: CryptoStore::new(key, config.cipher, config.backend, config.debug),
            namespace: config.namespace,
            commit_policy: config.commit_policy,
        })
    }

    /// Read `key` as a `T`, or `default` if it is absent, unreadable, or not
    /// a valid `T`.
    pub fn get<T: PrefValue>(&self, key: &str, default: T) -> T {
        self.crypto.get_typed(key, default)
    }

    /// Read `key` as text, or `default`.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key, default.to_owned())
    }

    /// Read `key` as an `i32`, or `default`.
    pub fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.get(key, default)
    }

    /// Read `key` as an `i64`, or `default`.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get(key, default)
    }

    /// Read `key` as an `f32`, or `default`.
    pub fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.get(key, default)
    }

    /// Read `key` as a `bool`, or `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key, default)
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.crypto.contains_key(key)
    }

    /// Start an edit transaction using the configured commit policy.
    pub fn edit(&self) -> BatchEditor<'_> {
        self.edit_with(self.commit_policy)
    }

    /// Start an edit transaction with an explicit commit policy.
    pub fn edit_with(&self, policy: CommitPolicy) -> BatchEditor<'_> {
        BatchEditor::new(&self.crypto, policy)
    }

    /// Encrypt and encode `value` exactly as the store would.
    ///
    /// Useful for producing an obfuscated constant during development that
    /// is later turned back with [`PrefStore::decrypt_value`].
    pub fn encrypt_value(&self, value: &str) -> Option<String> {
        self.crypto.encrypt_text(value)
    }

    /// Inverse of [`PrefStore::encrypt_value`].
    pub fn decrypt_value(&self, value: &str) -> Option<String> {
        self.crypto.decrypt_text(value)
    }

    /// Enable or disable verbose step logging.
    pub fn set_debug(&self, enabled: bool) {
        self.crypto.set_debug(enabled);
    }

    /// Returns `true` if verbose step logging is enabled.
    pub fn is_debug(&self) -> bool {
        self.crypto.is_debug()
    }

    /// Namespace this handle was configured with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Policy used by [`PrefStore::edit`].
    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::MemoryBackend;

    fn handle(backend: Arc<MemoryBackend>, secret: Option<&str>) -> PrefStore {
        let mut builder = PrefStore::builder().backend(backend);
        if let Some(s) = secret {
            builder = builder.secret(s);
        }
        PrefStore::new(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn namespace_key_is_stable_across_handles() {
        let backend = Arc::new(MemoryBackend::new());
        let a = handle(backend.clone(), None);
        let mut editor = a.edit();
        editor.put_string("k", "v");
        editor.apply().unwrap();

        let b = handle(backend, None);
        assert_eq!(b.get_string("k", "dflt"), "v");
    }

    #[test]
    fn explicit_secret_differs_from_namespace_key() {
        let backend = Arc::new(MemoryBackend::new());
        let a = handle(backend.clone(), Some("secret"));
        let mut editor = a.edit();
        editor.put_string("k", "v");
        editor.apply().unwrap();

        let b = handle(backend, None);
        assert_eq!(b.get_string("k", "dflt"), "dflt");
        assert!(!b.contains("k"));
    }

    #[test]
    fn utility_round_trip() {
        let store = handle(Arc::new(MemoryBackend::new()), Some("F/*-7lk(*(&#KD(S(()"));
        let encrypted = store.encrypt_value("You are hero").unwrap();
        assert_ne!(encrypted, "You are hero");
        assert_eq!(store.decrypt_value(&encrypted).as_deref(), Some("You are hero"));
    }

    #[test]
    fn edit_uses_configured_policy() {
        let backend = Arc::new(MemoryBackend::new());
        let store = PrefStore::new(
            PrefStore::builder()
                .backend(backend)
                .commit_policy(CommitPolicy::Deferred)
                .build()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(store.edit().policy(), CommitPolicy::Deferred);
        assert_eq!(
            store.edit_with(CommitPolicy::WriteThrough).policy(),
            CommitPolicy::WriteThrough
        );
    }

    #[test]
    fn debug_can_be_toggled() {
        let store = handle(Arc::new(MemoryBackend::new()), None);
        assert!(!store.is_debug());
        store.set_debug(true);
        assert!(store.is_debug());
        assert_eq!(store.namespace(), "default");
    }
}
