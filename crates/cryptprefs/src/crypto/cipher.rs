//! Deterministic AES-256-GCM-SIV encryption of text.
//!
//! Encrypted keys double as backend lookup handles, so encryption must map the
//! same plaintext and key to the same ciphertext. The nonce is therefore
//! synthetic: the first [`NONCE_LEN`] bytes of an HMAC-SHA256 over the
//! plaintext. AES-GCM-SIV tolerates nonce reuse for identical messages, which
//! is exactly what this produces.
//!
//! **Do NOT substitute plain AES-256-GCM.** Equal plaintexts share a nonce
//! here, and GCM nonce reuse breaks both confidentiality and authentication.
//!
//! # Ciphertext format
//!
//! ```text
//! base64-standard(nonce || ciphertext+tag)
//! ```

use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::key::{hmac_sha256, CipherKey};

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM-SIV authentication tag.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key material is unusable (empty secret or wrong length).
    #[error("invalid cipher key")]
    InvalidKey,

    /// AES-GCM-SIV encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The ciphertext is not valid base64 or is too short to hold a nonce and tag.
    #[error("invalid ciphertext format")]
    InvalidFormat,

    /// Decryption succeeded but the plaintext is not UTF-8.
    #[error("decrypted plaintext is not valid UTF-8")]
    InvalidUtf8,
}

/// Symmetric text cipher used to protect keys and values at rest.
///
/// Failures are reported as [`CipherError`], never as empty output.
#[cfg_attr(test, mockall::automock)]
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext` under `key`.
    fn encrypt(&self, key: &CipherKey, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt `ciphertext` previously produced by [`Cipher::encrypt`] with `key`.
    fn decrypt(&self, key: &CipherKey, ciphertext: &str) -> Result<String, CipherError>;
}

/// The default [`Cipher`]: deterministic AES-256-GCM-SIV.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmSivCipher;

impl Cipher for AesGcmSivCipher {
    fn encrypt(&self, key: &CipherKey, plaintext: &str) -> Result<String, CipherError> {
        let cipher = build_cipher(key)?;
        let synthetic = hmac_sha256(key.nonce_bytes(), plaintext.as_bytes())?;
        let nonce = Nonce::from_slice(&synthetic[..NONCE_LEN]);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::AeadFailure)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, key: &CipherKey, ciphertext: &str) -> Result<String, CipherError> {
        let raw = STANDARD
            .decode(ciphertext)
            .map_err(|_| CipherError::InvalidFormat)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);

        let cipher = build_cipher(key)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::AeadFailure)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

fn build_cipher(key: &CipherKey) -> Result<Aes256GcmSiv, CipherError> {
    Aes256GcmSiv::new_from_slice(key.enc_bytes()).map_err(|_| CipherError::InvalidKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(secret: &str) -> CipherKey {
        CipherKey::from_secret(secret).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let k = key("F/*-7lk(*(&#KD(S(()");
        for plaintext in ["", "testString", "123-45-6789", "ünïcødé ✓"] {
            let encrypted = AesGcmSivCipher.encrypt(&k, plaintext).unwrap();
            assert_eq!(AesGcmSivCipher.decrypt(&k, &encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn encryption_is_deterministic() {
        let k = key("secret");
        let a = AesGcmSivCipher.encrypt(&k, "user").unwrap();
        let b = AesGcmSivCipher.encrypt(&k, "user").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, AesGcmSivCipher.encrypt(&k, "users").unwrap());
    }

    #[test]
    fn empty_plaintext_yields_non_empty_ciphertext() {
        let encrypted = AesGcmSivCipher.encrypt(&key("secret"), "").unwrap();
        assert!(!encrypted.is_empty());
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encrypted = AesGcmSivCipher.encrypt(&key("one"), "secret").unwrap();
        assert_eq!(
            AesGcmSivCipher.decrypt(&key("two"), &encrypted),
            Err(CipherError::AeadFailure)
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            AesGcmSivCipher.decrypt(&key("k"), "!!!not base64!!!"),
            Err(CipherError::InvalidFormat)
        );
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let short = STANDARD.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        assert_eq!(
            AesGcmSivCipher.decrypt(&key("k"), &short),
            Err(CipherError::InvalidFormat)
        );
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let k = key("k");
        let encrypted = AesGcmSivCipher.encrypt(&k, "tamper me").unwrap();
        let mut raw = STANDARD.decode(&encrypted).unwrap();
        // Flip a byte in the sealed portion to simulate tampering.
        raw[NONCE_LEN] ^= 0xFF;
        assert_eq!(
            AesGcmSivCipher.decrypt(&k, &STANDARD.encode(raw)),
            Err(CipherError::AeadFailure)
        );
    }
}
