//! The closed set of value types a preference can hold.
//!
//! Every value is stored as its canonical text form (a numeric literal, or
//! `"true"` / `"false"`). The requested Rust type selects how that text is
//! coerced back on read, so no runtime type inspection is needed.

use std::fmt;

/// Tag naming the type a value was stored or requested as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Int32,
    Int64,
    Float32,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Float32 => "float32",
            ValueKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for String {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for bool {}
}

/// A type that can be written to and read from the store.
///
/// Implemented for `String`, `i32`, `i64`, `f32` and `bool` only.
pub trait PrefValue: sealed::Sealed + Sized {
    /// The tag for this type.
    const KIND: ValueKind;

    /// Canonical text form written to the store.
    fn to_text(&self) -> String;

    /// Parse a canonical text form back into a value.
    ///
    /// Returns `None` when `text` is not a valid literal of this type.
    fn from_text(text: &str) -> Option<Self>;
}

impl PrefValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }
}

impl PrefValue for i32 {
    const KIND: ValueKind = ValueKind::Int32;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl PrefValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl PrefValue for f32 {
    const KIND: ValueKind = ValueKind::Float32;

    fn to_text(&self) -> String {
        self.to_string()
    }

    /// Surrounding whitespace is ignored. Integer literals get no such leniency.
    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl PrefValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_text(&self) -> String {
        self.to_string()
    }

    /// `"true"` in any letter case is `true`; anything else is `false`.
    fn from_text(text: &str) -> Option<Self> {
        Some(text.eq_ignore_ascii_case("true"))
    }
}
