//! JSON codec: one message is one JSON array.
//!
//! ```text
//! ["A", 100, "B", 10, 1075]
//! ["T", "S", 4, 1075]
//! ```
//!
//! Strings and numbers are both accepted in any position; each element
//! is reduced to its text and decoded by the shared field decoder, so
//! the CSV and JSON front ends validate identically.

use serde_json::Value;

use book_core::{BookError, MarketEvent, Stats};

use crate::fields::decode_fields;

/// Parse a single JSON message.
///
/// Returns `None` for blank input. Malformed JSON, or JSON that is not
/// an array, is a corrupt event.
pub fn parse_json_message(text: &str, stats: &Stats) -> Option<Result<MarketEvent, BookError>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let fields = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(values)) => values.iter().map(field_text).collect::<Vec<_>>(),
        Ok(other) => return Some(Err(corrupt(stats, format!("expected array, got {other}")))),
        Err(e) => return Some(Err(corrupt(stats, e.to_string()))),
    };

    Some(decode_fields(&fields, stats))
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn corrupt(stats: &Stats, reason: String) -> BookError {
    let err = BookError::CorruptEvent(reason);
    stats.record(err.category());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_core::{ErrorCategory, Order, Side, Trade};

    #[test]
    fn decodes_mixed_arrays() {
        let stats = Stats::new();
        assert_eq!(
            parse_json_message(r#"["A", 100, "B", 10, 1075]"#, &stats),
            Some(Ok(MarketEvent::Add(Order::new(100, Side::Bid, 10, 1075))))
        );
        assert_eq!(
            parse_json_message(r#"["T","S","4","1075"]"#, &stats),
            Some(Ok(MarketEvent::Trade(Trade::new(Side::Ask, 4, 1075))))
        );
    }

    #[test]
    fn non_numeric_value_is_a_syntax_error() {
        let stats = Stats::new();
        let result = parse_json_message(r#"["A", 1, "B", 1.5, 10]"#, &stats);
        assert_eq!(result.map(|r| r.unwrap_err().category()), Some(ErrorCategory::QuantityParse));
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let stats = Stats::new();
        assert!(parse_json_message("   ", &stats).is_none());
        assert!(matches!(
            parse_json_message(r#"{"A": 1}"#, &stats),
            Some(Err(BookError::CorruptEvent(_)))
        ));
        assert!(matches!(
            parse_json_message("[\"A\", 1", &stats),
            Some(Err(BookError::CorruptEvent(_)))
        ));
        assert_eq!(stats.count(ErrorCategory::CorruptEvent), 2);
    }
}
