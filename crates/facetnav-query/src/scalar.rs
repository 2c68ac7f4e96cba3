//! Scalar codec for single query-string values.
//!
//! Decoding never fails: anything that is not a canonical value decodes to
//! `None`, which callers treat exactly like a missing key.

use serde::{Deserialize, Serialize};

/// Decode a number. Missing, blank and non-numeric input all yield `None`.
pub fn decode_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::trace!(raw, "number did not decode, treating as absent");
            None
        }
    }
}

/// Decode a page number: a whole number of at least 1.
pub fn decode_page(raw: Option<&str>) -> Option<u32> {
    let value = decode_number(raw)?;
    if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        tracing::trace!(value, "page out of range, treating as absent");
        None
    }
}

/// Encode a number in its canonical form (`1200`, not `1200.0`).
pub fn encode_number(value: f64) -> String {
    value.to_string()
}

/// How a boolean query parameter is read.
///
/// Two policies coexist because fields mean different things by "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanPolicy {
    /// `"true"` and `"false"` are both meaningful; anything else is unset.
    ///
    /// Used by three-state toggles such as `experimental`.
    Nullable,
    /// Only `"true"` is meaningful; `"false"` is the same as unset.
    ///
    /// Used by opt-in flags such as `excludeSolved` and `prioritizeRecent`.
    TrueOnly,
}

impl BooleanPolicy {
    /// Decode a raw value under this policy.
    pub fn decode(self, raw: Option<&str>) -> Option<bool> {
        match self {
            Self::Nullable => decode_nullable_bool(raw),
            Self::TrueOnly => decode_flag(raw),
        }
    }

    /// Canonical query value for `value`, or `None` when the policy has no
    /// encoding for it and the key must be omitted.
    pub fn encode(self, value: bool) -> Option<&'static str> {
        match (self, value) {
            (_, true) => Some("true"),
            (Self::Nullable, false) => Some("false"),
            (Self::TrueOnly, false) => None,
        }
    }
}

/// `"true"` → `true`, `"false"` → `false`, anything else → `None`.
pub fn decode_nullable_bool(raw: Option<&str>) -> Option<bool> {
    match raw? {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// `"true"` → `true`, anything else (including `"false"`) → `None`.
pub fn decode_flag(raw: Option<&str>) -> Option<bool> {
    match raw? {
        "true" => Some(true),
        _ => None,
    }
}

/// Canonical form of a boolean.
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_number() {
        assert_eq!(decode_number(None), None);
        assert_eq!(decode_number(Some("")), None);
        assert_eq!(decode_number(Some("abc")), None);
        assert_eq!(decode_number(Some("1200")), Some(1200.0));
        assert_eq!(decode_number(Some("-3.5")), Some(-3.5));
        assert_eq!(decode_number(Some(" 42 ")), Some(42.0));
    }

    #[test]
    fn test_decode_number_rejects_non_finite() {
        assert_eq!(decode_number(Some("NaN")), None);
        assert_eq!(decode_number(Some("inf")), None);
    }

    #[test]
    fn test_decode_page() {
        assert_eq!(decode_page(Some("3")), Some(3));
        assert_eq!(decode_page(Some("0")), None);
        assert_eq!(decode_page(Some("-1")), None);
        assert_eq!(decode_page(Some("2.5")), None);
        assert_eq!(decode_page(Some("two")), None);
    }

    #[test]
    fn test_encode_number_is_canonical() {
        assert_eq!(encode_number(1200.0), "1200");
        assert_eq!(encode_number(0.5), "0.5");
        assert_eq!(decode_number(Some(&encode_number(2800.0))), Some(2800.0));
    }

    #[test]
    fn test_nullable_bool() {
        assert_eq!(decode_nullable_bool(Some("true")), Some(true));
        assert_eq!(decode_nullable_bool(Some("false")), Some(false));
        assert_eq!(decode_nullable_bool(Some("TRUE")), None);
        assert_eq!(decode_nullable_bool(Some("")), None);
        assert_eq!(decode_nullable_bool(None), None);
    }

    #[test]
    fn test_flag() {
        assert_eq!(decode_flag(Some("true")), Some(true));
        assert_eq!(decode_flag(Some("false")), None);
        assert_eq!(decode_flag(None), None);
    }

    #[test]
    fn test_policy_encode_is_left_inverse() {
        for policy in [BooleanPolicy::Nullable, BooleanPolicy::TrueOnly] {
            for value in [true, false] {
                let encoded = policy.encode(value);
                let decoded = policy.decode(encoded);
                match (policy, value) {
                    (BooleanPolicy::TrueOnly, false) => assert_eq!(decoded, None),
                    _ => assert_eq!(decoded, Some(value)),
                }
            }
        }
        assert_eq!(encode_bool(false), "false");
    }
}
