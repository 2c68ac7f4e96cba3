//! Range codec: `from~to` labels and `<field>From`/`<field>To` key pairs.

use serde::{Deserialize, Serialize};

use crate::params::QueryParams;
use crate::scalar::{decode_number, encode_number};

/// Separator between the two bounds of a range label.
pub const RANGE_SEPARATOR: char = '~';

/// A numeric range, unbounded on a side whose bound is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound.
    pub from: Option<f64>,
    /// Upper bound.
    pub to: Option<f64>,
}

impl NumericRange {
    /// Create a range.
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { from, to }
    }

    /// Range bounded on both sides.
    pub fn between(from: f64, to: f64) -> Self {
        Self::new(Some(from), Some(to))
    }

    /// Range with only an upper bound.
    pub fn below(to: f64) -> Self {
        Self::new(None, Some(to))
    }

    /// Range with only a lower bound.
    pub fn above(from: f64) -> Self {
        Self::new(Some(from), None)
    }

    /// True when neither side is bounded. Such a range is never emitted.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Decode a `from~to` label. Whitespace around either side is ignored.
    ///
    /// Returns `None` for a label without exactly one `~`, with a side that
    /// is neither blank nor numeric, or with both sides blank.
    pub fn decode_label(label: &str) -> Option<Self> {
        let mut parts = label.split(RANGE_SEPARATOR);
        let from = parts.next()?.trim();
        let to = parts.next()?.trim();
        if parts.next().is_some() {
            return None;
        }

        let from = decode_side(from)?;
        let to = decode_side(to)?;
        let range = Self::new(from, to);
        if range.is_unbounded() {
            return None;
        }
        Some(range)
    }

    /// Encode as a canonical `from~to` label.
    pub fn encode_label(&self) -> String {
        format!(
            "{}{}{}",
            self.from.map(encode_number).unwrap_or_default(),
            RANGE_SEPARATOR,
            self.to.map(encode_number).unwrap_or_default()
        )
    }

    /// Decode from a two-key pair.
    ///
    /// Absence of both keys is "no filter". A present but malformed key
    /// counts as an unbounded side; if that leaves both sides unbounded the
    /// result is also "no filter".
    pub fn decode_keys(params: &QueryParams, keys: &RangeKeys) -> Option<Self> {
        let from = params.get(&keys.from);
        let to = params.get(&keys.to);
        if from.is_none() && to.is_none() {
            return None;
        }

        let range = Self::new(decode_number(from), decode_number(to));
        if range.is_unbounded() {
            None
        } else {
            Some(range)
        }
    }

    /// Write this range into `params` as a two-key pair.
    ///
    /// Both keys are removed first, so an absent bound never leaves a stale
    /// value behind.
    pub fn write_keys(&self, params: &mut QueryParams, keys: &RangeKeys) {
        keys.clear(params);
        if let Some(from) = self.from {
            params.append(keys.from.clone(), encode_number(from));
        }
        if let Some(to) = self.to {
            params.append(keys.to.clone(), encode_number(to));
        }
    }

    /// Whether `value` falls inside the range (lower bound inclusive,
    /// upper bound exclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value < to)
    }
}

fn decode_side(side: &str) -> Option<Option<f64>> {
    if side.is_empty() {
        return Some(None);
    }
    decode_number(Some(side)).map(Some)
}

/// Query keys carrying the two bounds of a range field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeKeys {
    /// Key of the lower bound.
    pub from: String,
    /// Key of the upper bound.
    pub to: String,
}

impl RangeKeys {
    /// `<field>From` / `<field>To`.
    pub fn for_field(field: &str) -> Self {
        Self {
            from: format!("{}From", field),
            to: format!("{}To", field),
        }
    }

    /// Remove both keys from `params`.
    pub fn clear(&self, params: &mut QueryParams) {
        params.remove(&self.from);
        params.remove(&self.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_label() {
        assert_eq!(
            NumericRange::decode_label("1200~1600"),
            Some(NumericRange::between(1200.0, 1600.0))
        );
        assert_eq!(NumericRange::decode_label("~400"), Some(NumericRange::below(400.0)));
        assert_eq!(NumericRange::decode_label("2800~"), Some(NumericRange::above(2800.0)));
    }

    #[test]
    fn test_decode_label_accepts_spaced_form() {
        assert_eq!(
            NumericRange::decode_label("1200 ~ 1600"),
            Some(NumericRange::between(1200.0, 1600.0))
        );
    }

    #[test]
    fn test_decode_label_rejects_malformed() {
        assert_eq!(NumericRange::decode_label("1200"), None);
        assert_eq!(NumericRange::decode_label("1~2~3"), None);
        assert_eq!(NumericRange::decode_label("a~b"), None);
        assert_eq!(NumericRange::decode_label("~"), None);
    }

    #[test]
    fn test_label_round_trip() {
        for label in ["1200~1600", "~400", "2800~", "0~400", "-5~5"] {
            let range = NumericRange::decode_label(label).unwrap();
            assert_eq!(range.encode_label(), label);
        }
    }

    #[test]
    fn test_decode_keys() {
        let keys = RangeKeys::for_field("difficulty");
        assert_eq!(keys.from, "difficultyFrom");
        assert_eq!(keys.to, "difficultyTo");

        let params = QueryParams::parse("difficultyFrom=1200&difficultyTo=1600");
        assert_eq!(
            NumericRange::decode_keys(&params, &keys),
            Some(NumericRange::between(1200.0, 1600.0))
        );

        let params = QueryParams::parse("difficultyTo=400");
        assert_eq!(NumericRange::decode_keys(&params, &keys), Some(NumericRange::below(400.0)));
    }

    #[test]
    fn test_decode_keys_absent_or_malformed_is_no_filter() {
        let keys = RangeKeys::for_field("rating");
        assert_eq!(NumericRange::decode_keys(&QueryParams::parse("q=x"), &keys), None);
        assert_eq!(
            NumericRange::decode_keys(&QueryParams::parse("ratingFrom=abc&ratingTo="), &keys),
            None
        );
        assert_eq!(
            NumericRange::decode_keys(&QueryParams::parse("ratingFrom=abc&ratingTo=800"), &keys),
            Some(NumericRange::below(800.0))
        );
    }

    #[test]
    fn test_write_keys_replaces_previous_bounds() {
        let keys = RangeKeys::for_field("difficulty");
        let mut params = QueryParams::parse("q=dp&difficultyFrom=0&difficultyTo=400");
        NumericRange::above(2800.0).write_keys(&mut params, &keys);
        assert_eq!(params.to_query_string(), "q=dp&difficultyFrom=2800");
    }

    #[test]
    fn test_contains() {
        let range = NumericRange::between(400.0, 800.0);
        assert!(range.contains(400.0));
        assert!(range.contains(799.0));
        assert!(!range.contains(800.0));
        assert!(NumericRange::below(400.0).contains(-10.0));
    }
}
