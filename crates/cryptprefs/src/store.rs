//! [`CryptoStore`]: the single owner of the cipher key and backend handle.
//!
//! Every key and value passes through here on its way to and from the
//! backend: `cipher -> codec` when writing, `codec -> cipher` when reading.
//! Typed reads are total. A missing key, a crypto failure, a backend read
//! failure and a value that does not parse as the requested type all return
//! the caller's default.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use common::PrefValue;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::codec;
use crate::crypto::{Cipher, CipherKey};

/// Encryption pipeline bound to one backend and one key.
pub struct CryptoStore {
    key: CipherKey,
    cipher: Arc<dyn Cipher>,
    backend: Arc<dyn Backend>,
    /// Serialises backend mutations issued through editors.
    write_lock: Mutex<()>,
    debug: AtomicBool,
}

impl CryptoStore {
    /// Create a store over `backend` that encrypts with `cipher` under `key`.
    pub fn new(
        key: CipherKey,
        cipher: Arc<dyn Cipher>,
        backend: Arc<dyn Backend>,
        debug: bool,
    ) -> Self {
        Self {
            key,
            cipher,
            backend,
            write_lock: Mutex::new(()),
            debug: AtomicBool::new(debug),
        }
    }

    /// Encrypt `plain` and encode the result for the backend.
    ///
    /// Returns `None` if the cipher rejects the input.
    pub fn encrypt_text(&self, plain: &str) -> Option<String> {
        let encrypted = match self.cipher.encrypt(&self.key, plain) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "encryption failed");
                return None;
            }
        };
        let encoded = codec::encode(&encrypted);
        if self.is_debug() {
            debug!(cipher_output = %encrypted, encoded = %encoded, "cipher output encoded");
        }
        #[cfg(feature = "log-plaintext")]
        if self.is_debug() {
            debug!(plain = %plain, encoded = %encoded, "encrypt_text");
        }
        Some(encoded)
    }

    /// Decode `cipher_safe` and decrypt it.
    ///
    /// Returns `None` if the text is not valid ciphertext for this key.
    pub fn decrypt_text(&self, cipher_safe: &str) -> Option<String> {
        let decoded = codec::decode(cipher_safe);
        if self.is_debug() {
            debug!(encoded = %cipher_safe, cipher_output = %decoded, "encoding removed");
        }
        match self.cipher.decrypt(&self.key, &decoded) {
            Ok(plain) => {
                #[cfg(feature = "log-plaintext")]
                if self.is_debug() {
                    debug!(encoded = %cipher_safe, plain = %plain, "decrypt_text");
                }
                Some(plain)
            }
            Err(e) => {
                warn!(error = %e, "decryption failed");
                None
            }
        }
    }

    /// Read `key` as a `T`, falling back to `default` on any failure.
    ///
    /// An empty decrypted text yields `default` for every type, text included.
    pub fn get_typed<T: PrefValue>(&self, key: &str, default: T) -> T {
        let enc_key = match self.encrypt_text(key) {
            Some(k) if !k.is_empty() => k,
            _ => {
                if self.is_debug() {
                    debug!(kind = %T::KIND, "unable to encrypt key");
                }
                return default;
            }
        };
        if self.is_debug() {
            debug!(encrypted_key = %enc_key, kind = %T::KIND, "get_typed");
        }

        let raw = match self.backend.get(&enc_key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                if self.is_debug() {
                    debug!(encrypted_key = %enc_key, "no stored value");
                }
                return default;
            }
            Err(e) => {
                warn!(error = %e, "backend read failed");
                return default;
            }
        };
        if self.is_debug() {
            debug!(encrypted_value = %raw, "stored value found");
        }

        let Some(plain) = self.decrypt_text(&raw) else {
            return default;
        };
        if plain.is_empty() {
            if self.is_debug() {
                debug!(kind = %T::KIND, "decrypted value is empty");
            }
            return default;
        }

        match T::from_text(&plain) {
            Some(value) => value,
            None => {
                if self.is_debug() {
                    debug!(kind = %T::KIND, "stored value does not parse as requested type");
                }
                default
            }
        }
    }

    /// Return `true` if an entry exists for `key`.
    ///
    /// Returns `false` if `key` cannot be encrypted or the backend read fails.
    pub fn contains_key(&self, key: &str) -> bool {
        let Some(enc_key) = self.encrypt_text(key) else {
            return false;
        };
        match self.backend.contains(&enc_key) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "backend read failed");
                false
            }
        }
    }

    /// Enable or disable verbose step logging.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Returns `true` if verbose step logging is enabled.
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }
}

impl std::fmt::Debug for CryptoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoStore")
            .field("key", &self.key)
            .field("debug", &self.is_debug())
            .finish_non_exhaustive()
    }
}
