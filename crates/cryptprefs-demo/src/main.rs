//! `cryptprefs-demo` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Settings`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Open the file-backed store, write four typed values, read them back,
//!    clear the store, then run the utility encrypt/decrypt helpers.

use anyhow::{Context, Result};
use cryptprefs::{telemetry, Settings};
use tracing::info;

const KEY_STRING: &str = "test_key_value_string";
const KEY_FLOAT: &str = "test_key_value_float";
const KEY_LONG: &str = "test_key_value_long";
const KEY_BOOLEAN: &str = "test_key_value_boolean";

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let settings = Settings::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&settings.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        namespace = %settings.prefs_namespace,
        "cryptprefs-demo starting"
    );

    // -----------------------------------------------------------------------
    // 3. Demo flow
    // -----------------------------------------------------------------------
    let store = settings.open_store()?;

    let mut editor = store.edit();
    editor
        .put_string(KEY_STRING, "testString")
        .put_f32(KEY_FLOAT, 1.5)
        .put_i64(KEY_LONG, 10)
        .put_bool(KEY_BOOLEAN, false);
    let written = editor.apply().context("failed to write demo values")?;
    info!(written, "demo values written");

    info!(key = KEY_STRING, value = %store.get_string(KEY_STRING, KEY_STRING), "read");
    info!(key = KEY_FLOAT, value = store.get_f32(KEY_FLOAT, 0.0), "read");
    info!(key = KEY_LONG, value = store.get_i64(KEY_LONG, 0), "read");
    info!(key = KEY_BOOLEAN, value = store.get_bool(KEY_BOOLEAN, true), "read");
    info!(
        key = KEY_STRING,
        value = store.get_i64(KEY_STRING, 0),
        "read as int64 falls back to default"
    );

    let mut wipe = store.edit();
    wipe.clear();
    wipe.apply().context("failed to clear demo values")?;
    info!(present = store.contains(KEY_STRING), "store cleared");

    // Obfuscate a constant once, ship only the encrypted form.
    let encrypted = store
        .encrypt_value("You are hero")
        .context("utility encryption failed")?;
    let decrypted = store
        .decrypt_value(&encrypted)
        .context("utility decryption failed")?;
    let matches = decrypted == "You are hero";
    info!(encrypted = %encrypted, matches, "utility round trip");

    Ok(())
}
