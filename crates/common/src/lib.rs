//! Common value types and errors shared across `cryptprefs` crates.

pub mod error;
pub mod value;

pub use error::StoreError;
pub use value::{PrefValue, ValueKind};
