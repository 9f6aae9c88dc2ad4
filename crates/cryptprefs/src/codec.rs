//! Backend-safe text encoding of cipher output.
//!
//! Cipher output is standard base64, which uses `+`, `/` and `=`. Backends are
//! only guaranteed to round-trip text free of those characters, so each one is
//! replaced by a multi-character sentinel. Every sentinel starts with `-`,
//! which never occurs in standard base64, so a sentinel can never be confused
//! with a run of genuine cipher output.

use std::borrow::Cow;

/// `(reserved, sentinel)` pairs, applied in this order by both directions.
const SUBSTITUTIONS: [(&str, &str); 3] = [("+", "-P1-"), ("/", "-P2-"), ("=", "-P3-")];

/// Replace every reserved character with its sentinel.
pub fn encode(text: &str) -> String {
    SUBSTITUTIONS
        .iter()
        .fold(Cow::Borrowed(text), |acc, (reserved, sentinel)| {
            replace(acc, reserved, sentinel)
        })
        .into_owned()
}

/// Replace every sentinel with the reserved character it stands for.
pub fn decode(text: &str) -> String {
    SUBSTITUTIONS
        .iter()
        .fold(Cow::Borrowed(text), |acc, (reserved, sentinel)| {
            replace(acc, sentinel, reserved)
        })
        .into_owned()
}

fn replace<'a>(text: Cow<'a, str>, from: &str, to: &str) -> Cow<'a, str> {
    if text.contains(from) {
        Cow::Owned(text.replace(from, to))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_removes_reserved_characters() {
        let encoded = encode("ab+cd/ef==");
        assert_eq!(encoded, "ab-P1-cd-P2-ef-P3--P3-");
        assert!(!encoded.contains(['+', '/', '=']));
    }

    #[test]
    fn decode_inverts_encode() {
        for sample in ["", "plain", "+/=", "a+b/c=", "++//==", "P1P2P3", "x0P1Xx+"] {
            assert_eq!(decode(&encode(sample)), sample);
        }
    }

    #[test]
    fn text_without_reserved_characters_is_untouched() {
        assert_eq!(encode("AbCd0123"), "AbCd0123");
        assert_eq!(decode("AbCd0123"), "AbCd0123");
    }

    #[test]
    fn sentinel_like_base64_runs_are_not_decoded() {
        // Only the dash-delimited form is a sentinel.
        assert_eq!(decode("P1P2P3"), "P1P2P3");
    }
}
