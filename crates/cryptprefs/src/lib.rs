//! `cryptprefs` — an encrypted, typed key/value preference store.
//!
//! Values of a closed set of types (text, `i32`, `i64`, `f32`, `bool`) are
//! written under string keys to an arbitrary string-to-string [`Backend`].
//! Both keys and values pass through a symmetric [`Cipher`] and a
//! backend-safe [`codec`] first, so the raw backend contents never reveal
//! plaintext.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cryptprefs::{MemoryBackend, PrefStore};
//!
//! # fn main() -> Result<(), cryptprefs::StoreError> {
//! let store = PrefStore::new(
//!     PrefStore::builder()
//!         .backend(Arc::new(MemoryBackend::new()))
//!         .secret("app-secret")
//!         .build()?,
//! )?;
//!
//! let mut editor = store.edit();
//! editor.put_string("user", "alice").put_bool("onboarded", true);
//! editor.apply()?;
//!
//! assert_eq!(store.get_string("user", ""), "alice");
//! assert_eq!(store.get_i64("user", 0), 0);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod editor;
pub mod handle;
pub mod store;
pub mod telemetry;

pub use backend::{Backend, BackendError, FileBackend, MemoryBackend};
pub use common::{PrefValue, StoreError, ValueKind};
pub use config::{Settings, StoreConfig, StoreConfigBuilder, DEFAULT_NAMESPACE};
pub use crypto::{AesGcmSivCipher, Cipher, CipherError, CipherKey};
pub use editor::{BatchEditor, CommitPolicy, PendingEdit};
pub use handle::PrefStore;
pub use store::CryptoStore;
