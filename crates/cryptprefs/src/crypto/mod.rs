//! Text encryption primitives.
//!
//! This module is free of backend and configuration concerns. It provides the
//! [`Cipher`] seam, the default deterministic AES-256-GCM-SIV implementation,
//! and the [`CipherKey`] derived from a caller secret.

pub mod cipher;
pub mod key;

pub use cipher::{AesGcmSivCipher, Cipher, CipherError};
pub use key::CipherKey;
