//! Tracing subscriber setup for processes embedding the store.
//!
//! Store events fall into two groups:
//! - `warn!` for recoverable failures (cipher rejected input, backend read or
//!   write failed). These carry the error only, never a key or value.
//! - `debug!` step descriptions (encode, decode, encrypt, decrypt, put,
//!   remove, clear). These are emitted only while the handle's debug toggle is
//!   on, and they show ciphertext forms only.
//!
//! Plaintext keys and values appear only in builds with the non-default
//! `log-plaintext` feature, and even then only while the debug toggle is on.
//! Select them with a filter such as `RUST_LOG=cryptprefs=debug`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise a structured JSON subscriber at `log_level`.
///
/// `RUST_LOG`, when set, overrides `log_level`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
