//! Common error types shared across crates.

use thiserror::Error;

/// Top-level store error type.
///
/// Only construction, configuration and explicit flushes return this type.
/// Typed reads never do: every data-related failure collapses to the caller's
/// default value instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store handle was requested without a backend to write to.
    #[error("store not configured: {0}")]
    NotConfigured(String),

    /// The cipher secret could not be turned into usable key material.
    #[error("invalid cipher key: {0}")]
    InvalidKey(String),

    /// The backend failed to read, write or persist its entries.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A configuration value was missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns `true` for errors caused by using the API incorrectly rather
    /// than by the environment.
    pub fn is_misuse(&self) -> bool {
        matches!(self, StoreError::NotConfigured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_classification() {
        assert!(StoreError::NotConfigured("x".into()).is_misuse());
        assert!(!StoreError::InvalidKey("x".into()).is_misuse());
        assert!(!StoreError::Backend("x".into()).is_misuse());
        assert!(!StoreError::Config("x".into()).is_misuse());
    }

    #[test]
    fn display_includes_message() {
        let e = StoreError::NotConfigured("no backend supplied".into());
        assert!(e.to_string().contains("no backend supplied"));
    }
}
