//! Quote Types
//!
//! Records delivered by the upstream quote service, both in the HTTP
//! snapshot and in every push frame. A frame always carries the complete
//! list; records are never patched individually.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Quote Record
// =============================================================================

/// A single stock quote as delivered by upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    /// Ticker symbol, unique within one list.
    pub symbol: String,
    /// Price at the open.
    #[serde(with = "rust_decimal::serde::float")]
    pub open_price: Decimal,
    /// Latest price.
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    /// How often upstream refreshes this symbol, in seconds.
    pub refresh_interval: u32,
}

impl QuoteRecord {
    /// Create a new quote record.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        open_price: Decimal,
        current_price: Decimal,
        refresh_interval: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            open_price,
            current_price,
            refresh_interval,
        }
    }
}

// =============================================================================
// Quote List
// =============================================================================

/// Ordered list of quotes, in the order upstream delivered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteList(Vec<QuoteRecord>);

impl QuoteList {
    /// Create an empty list.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Decode a JSON array payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON array of quote records.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let trimmed = text.trim();

        if !trimmed.starts_with('[') {
            return Err(DecodeError::InvalidFormat(format!(
                "expected JSON array, got: {}",
                trimmed.chars().take(50).collect::<String>()
            )));
        }

        Ok(serde_json::from_str(trimmed)?)
    }

    /// Encode as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the records in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, QuoteRecord> {
        self.0.iter()
    }

    /// Symbols in delivery order.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.0.iter().map(|q| q.symbol.as_str()).collect()
    }

    /// Borrow the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[QuoteRecord] {
        &self.0
    }
}

impl From<Vec<QuoteRecord>> for QuoteList {
    fn from(records: Vec<QuoteRecord>) -> Self {
        Self(records)
    }
}

impl<'a> IntoIterator for &'a QuoteList {
    type Item = &'a QuoteRecord;
    type IntoIter = std::slice::Iter<'a, QuoteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors decoding a quote payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was not a JSON array.
    #[error("invalid payload format: {0}")]
    InvalidFormat(String),
}

// =============================================================================
// Requested Count
// =============================================================================

/// Number of symbols the user wants to see, always within
/// [`RequestedCount::MIN`]..=[`RequestedCount::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestedCount(u8);

impl RequestedCount {
    /// Smallest allowed count.
    pub const MIN: u8 = 1;
    /// Largest allowed count.
    pub const MAX: u8 = 20;

    /// Build a count from raw input, clamping into range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let bounded = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // In range after the clamp above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(bounded as u8)
    }

    /// Build a count, rejecting out-of-range values.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Parse user input such as a line typed into the count control.
    ///
    /// Returns `None` when the text is not an integer at all.
    #[must_use]
    pub fn parse_clamped(text: &str) -> Option<Self> {
        text.trim().parse::<i64>().ok().map(Self::clamped)
    }

    /// The count as an integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for RequestedCount {
    fn default() -> Self {
        Self(10)
    }
}

impl std::fmt::Display for RequestedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn decode_quote_array() {
        let json = r#"[
            {"symbol":"A","openPrice":10,"currentPrice":10.5,"refreshInterval":5},
            {"symbol":"B","openPrice":20.25,"currentPrice":19.75,"refreshInterval":1}
        ]"#;

        let list = QuoteList::from_json(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.symbols(), vec!["A", "B"]);

        let first = &list.as_slice()[0];
        assert_eq!(first.open_price, Decimal::new(10, 0));
        assert_eq!(first.current_price, Decimal::new(105, 1));
        assert_eq!(first.refresh_interval, 5);
    }

    #[test]
    fn decode_empty_array() {
        let list = QuoteList::from_json("[]").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn decode_preserves_upstream_order() {
        let json = r#"[
            {"symbol":"ZZZ","openPrice":1,"currentPrice":1,"refreshInterval":1},
            {"symbol":"AAA","openPrice":1,"currentPrice":1,"refreshInterval":1}
        ]"#;

        let list = QuoteList::from_json(json).unwrap();
        assert_eq!(list.symbols(), vec!["ZZZ", "AAA"]);
    }

    #[test]
    fn decode_rejects_non_json() {
        let err = QuoteList::from_json("not json at all").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat(_)));
    }

    #[test]
    fn decode_rejects_single_object() {
        let json = r#"{"symbol":"A","openPrice":1,"currentPrice":1,"refreshInterval":1}"#;
        let err = QuoteList::from_json(json).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat(_)));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = QuoteList::from_json(r#"[{"symbol":"A"}]"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn encode_uses_camel_case_numbers() {
        let list = QuoteList::from(vec![QuoteRecord::new(
            "AAPL",
            Decimal::new(1500, 1),
            Decimal::new(1525, 1),
            3,
        )]);

        let json = list.to_json().unwrap();
        assert!(json.contains(r#""openPrice":150.0"#));
        assert!(json.contains(r#""currentPrice":152.5"#));
        assert!(json.contains(r#""refreshInterval":3"#));
    }

    #[test_case(-5 => 1 ; "negative clamps to min")]
    #[test_case(0 => 1 ; "zero clamps to min")]
    #[test_case(1 => 1 ; "min")]
    #[test_case(7 => 7 ; "in range")]
    #[test_case(20 => 20 ; "max")]
    #[test_case(21 => 20 ; "just above max")]
    #[test_case(500 => 20 ; "far above max")]
    fn count_clamping(raw: i64) -> u8 {
        RequestedCount::clamped(raw).get()
    }

    #[test]
    fn count_new_rejects_out_of_range() {
        assert!(RequestedCount::new(0).is_none());
        assert!(RequestedCount::new(21).is_none());
        assert_eq!(RequestedCount::new(3).map(RequestedCount::get), Some(3));
    }

    #[test]
    fn count_parse_user_input() {
        assert_eq!(RequestedCount::parse_clamped(" 5\n").map(RequestedCount::get), Some(5));
        assert_eq!(RequestedCount::parse_clamped("99").map(RequestedCount::get), Some(20));
        assert!(RequestedCount::parse_clamped("five").is_none());
    }

    #[test]
    fn count_default_is_ten() {
        assert_eq!(RequestedCount::default().get(), 10);
    }

    proptest! {
        #[test]
        fn clamped_count_always_in_range(raw in any::<i64>()) {
            let count = RequestedCount::clamped(raw).get();
            prop_assert!((RequestedCount::MIN..=RequestedCount::MAX).contains(&count));
        }
    }
}
