//! Configuration for opening a [`PrefStore`](crate::PrefStore).
//!
//! Two layers:
//! - [`StoreConfig`], produced by [`StoreConfigBuilder`]: the immutable inputs
//!   a handle is built from. Building fails if no backend was supplied.
//! - [`Settings`]: environment-driven configuration for processes that keep
//!   their preferences in a file backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use common::StoreError;
use serde::Deserialize;

use crate::backend::{Backend, FileBackend};
use crate::crypto::{AesGcmSivCipher, Cipher};
use crate::editor::CommitPolicy;
use crate::handle::PrefStore;

/// Namespace used when the caller does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Validated, immutable inputs for a store handle.
pub struct StoreConfig {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) cipher: Arc<dyn Cipher>,
    pub(crate) secret: Option<String>,
    pub(crate) namespace: String,
    pub(crate) debug: bool,
    pub(crate) commit_policy: CommitPolicy,
}

impl StoreConfig {
    /// Start building a configuration.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Namespace the key is derived from when no secret is given.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether verbose step logging starts enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Default policy for editors created by the handle.
    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }

    /// Returns `true` if a non-empty secret was supplied. Otherwise the key is
    /// derived from the namespace.
    pub fn has_explicit_secret(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("namespace", &self.namespace)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("debug", &self.debug)
            .field("commit_policy", &self.commit_policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Default)]
pub struct StoreConfigBuilder {
    backend: Option<Arc<dyn Backend>>,
    cipher: Option<Arc<dyn Cipher>>,
    secret: Option<String>,
    namespace: Option<String>,
    debug: bool,
    commit_policy: CommitPolicy,
}

impl StoreConfigBuilder {
    /// Backend the store reads from and writes to. **Required.**
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Cipher implementation. Defaults to [`AesGcmSivCipher`].
    pub fn cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Secret the cipher key is derived from. Defaults to the namespace.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Stable identifier for this store. Defaults to [`DEFAULT_NAMESPACE`].
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Log a description of every encode/decode/encrypt/decrypt step.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Default policy for editors. Defaults to [`CommitPolicy::WriteThrough`].
    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] if no backend was supplied and
    /// [`StoreError::Config`] if the namespace is blank.
    pub fn build(self) -> Result<StoreConfig, StoreError> {
        let backend = self
            .backend
            .ok_or_else(|| StoreError::NotConfigured("no backend supplied".into()))?;
        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned());
        if namespace.trim().is_empty() {
            return Err(StoreError::Config("namespace must not be empty".into()));
        }
        Ok(StoreConfig {
            backend,
            cipher: self.cipher.unwrap_or_else(|| Arc::new(AesGcmSivCipher)),
            secret: self.secret,
            namespace,
            debug: self.debug,
            commit_policy: self.commit_policy,
        })
    }
}

/// Environment-driven settings for a file-backed store.
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Directory holding one JSON document per namespace. **Required.**
    pub prefs_dir: String,

    /// Namespace, used as the document name and the default key seed.
    #[serde(default = "default_namespace")]
    pub prefs_namespace: String,

    /// Cipher secret. Derived from the namespace when absent.
    #[serde(default)]
    pub prefs_secret: Option<String>,

    /// Verbose step logging.
    #[serde(default)]
    pub prefs_debug: bool,

    /// `write-through` or `deferred`.
    #[serde(default)]
    pub prefs_commit_policy: CommitPolicy,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Settings {
    /// Load and validate settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PREFS_DIR` is absent or any value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let s: Settings = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        s.validate()?;
        Ok(s)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.prefs_dir.trim().is_empty() {
            anyhow::bail!("PREFS_DIR is required and must not be empty");
        }
        if self.prefs_namespace.trim().is_empty() {
            anyhow::bail!("PREFS_NAMESPACE must not be empty");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Open the file-backed store these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing document cannot be opened or the
    /// cipher key cannot be derived.
    pub fn open_store(&self) -> Result<PrefStore> {
        let backend = FileBackend::open(&self.prefs_dir, &self.prefs_namespace)
            .with_context(|| format!("failed to open preference store in {}", self.prefs_dir))?;

        let mut builder = StoreConfig::builder()
            .backend(Arc::new(backend))
            .namespace(self.prefs_namespace.clone())
            .debug(self.prefs_debug)
            .commit_policy(self.prefs_commit_policy);
        if let Some(secret) = &self.prefs_secret {
            builder = builder.secret(secret.clone());
        }

        let store = PrefStore::new(builder.build()?)?;
        Ok(store)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("prefs_dir", &self.prefs_dir)
            .field("prefs_namespace", &self.prefs_namespace)
            .field("prefs_secret", &self.prefs_secret.as_ref().map(|_| "[REDACTED]"))
            .field("prefs_debug", &self.prefs_debug)
            .field("prefs_commit_policy", &self.prefs_commit_policy)
            .field("log_level", &self.log_level)
            .finish()
    }
}
