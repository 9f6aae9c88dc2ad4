//! [`CipherKey`]: key material derived from the caller's secret.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::cipher::CipherError;

/// Byte length of each derived subkey (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

const ENC_LABEL: &[u8] = b"cryptprefs/v1/enc";
const NONCE_LABEL: &[u8] = b"cryptprefs/v1/nonce";

type HmacSha256 = Hmac<Sha256>;

/// Immutable key material for one store handle.
///
/// Holds two subkeys derived from the secret: one for AES-256-GCM-SIV and one
/// for computing synthetic nonces. The same secret always yields the same
/// subkeys. Key bytes are overwritten with zeroes on drop.
#[derive(Clone)]
pub struct CipherKey {
    enc: Box<[u8; KEY_LEN]>,
    nonce: Box<[u8; KEY_LEN]>,
}

impl CipherKey {
    /// Derive key material from an explicit secret.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKey`] if `secret` is empty.
    pub fn from_secret(secret: &str) -> Result<Self, CipherError> {
        if secret.is_empty() {
            return Err(CipherError::InvalidKey);
        }
        let master = Sha256::digest(secret.as_bytes());
        Ok(Self {
            enc: Box::new(hmac_sha256(&master, ENC_LABEL)?),
            nonce: Box::new(hmac_sha256(&master, NONCE_LABEL)?),
        })
    }

    /// Derive the default key material for a namespace.
    ///
    /// Used when the caller supplies no secret. Anyone who knows the namespace
    /// can derive this key, so it only hides contents from casual inspection.
    pub fn for_namespace(namespace: &str) -> Result<Self, CipherError> {
        Self::from_secret(namespace)
    }

    pub(crate) fn enc_bytes(&self) -> &[u8] {
        &self.enc[..]
    }

    pub(crate) fn nonce_bytes(&self) -> &[u8] {
        &self.nonce[..]
    }

    fn wipe(&mut self) {
        self.enc.zeroize();
        self.nonce.zeroize();
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}

/// HMAC-SHA256 of `data` under `key`.
pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; KEY_LEN], CipherError> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| CipherError::InvalidKey)?;
    mac.update(data);
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_secret_same_key() {
        let a = CipherKey::from_secret("hunter2").unwrap();
        let b = CipherKey::from_secret("hunter2").unwrap();
        assert_eq!(a.enc_bytes(), b.enc_bytes());
        assert_eq!(a.nonce_bytes(), b.nonce_bytes());
    }

    #[test]
    fn different_secrets_differ() {
        let a = CipherKey::from_secret("one").unwrap();
        let b = CipherKey::from_secret("two").unwrap();
        assert_ne!(a.enc_bytes(), b.enc_bytes());
    }

    #[test]
    fn subkeys_are_independent() {
        let key = CipherKey::from_secret("secret").unwrap();
        assert_ne!(key.enc_bytes(), key.nonce_bytes());
        assert_eq!(key.enc_bytes().len(), KEY_LEN);
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(matches!(
            CipherKey::from_secret(""),
            Err(CipherError::InvalidKey)
        ));
    }

    #[test]
    fn namespace_key_is_deterministic() {
        let a = CipherKey::for_namespace("com.example.app").unwrap();
        let b = CipherKey::for_namespace("com.example.app").unwrap();
        assert_eq!(a.enc_bytes(), b.enc_bytes());
    }

    #[test]
    fn wipe_zeroes_both_subkeys() {
        let mut key = CipherKey::from_secret("wipe-me").unwrap();
        assert!(key.enc_bytes().iter().any(|b| *b != 0));
        key.wipe();
        assert!(key.enc_bytes().iter().all(|b| *b == 0));
        assert!(key.nonce_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = CipherKey::from_secret("do-not-print").unwrap();
        let shown = format!("{key:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("do-not-print"));
    }
}
