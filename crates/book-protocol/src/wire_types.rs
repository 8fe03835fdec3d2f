//! Low-level wire constants.
//!
//! This module defines:
//! - Event tags as they appear in field 0 of an input message.
//! - Field counts per message kind.
//! - Sizes of the fixed binary [`BookData`](book_core::BookData) record.
//!
//! The actual encode/decode logic lives in `fields`, `csv_codec`,
//! `json_codec` and `binary_codec`.

pub const TAG_ADD: &str = "A";
pub const TAG_MODIFY: &str = "M";
pub const TAG_CANCEL: &str = "X";
pub const TAG_TRADE: &str = "T";
pub const TAG_SNAPSHOT: &str = "S";

/// Side char used when no side is known (no trade yet, or no trade in a snapshot).
pub const SIDE_UNKNOWN: char = 'U';

/// Fields after the tag in an Add / Modify / Cancel: id, side, qty, price.
pub const ORDER_FIELDS: usize = 4;

/// Fields after the tag in a Trade: side, qty, price.
pub const TRADE_FIELDS: usize = 3;

/// One snapshot level tuple: bid count, qty, price, then ask count, qty, price.
pub const SNAPSHOT_LEVEL_FIELDS: usize = 6;

/// Bytes per rendered level: contributors (i32), quantity (i32), price (f64).
pub const LEVEL_RECORD_LEN: usize = 4 + 4 + 8;

/// Bytes per trade summary: side (u8), quantity (u32), price (u32).
pub const TRADE_RECORD_LEN: usize = 1 + 4 + 4;

/// Size of one binary `BookData` record of the given depth.
///
/// Bids then asks, last trade, total traded, one event byte.
pub fn book_data_len(depth: usize) -> usize {
    2 * depth * LEVEL_RECORD_LEN + 2 * TRADE_RECORD_LEN + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_len_for_default_depth() {
        assert_eq!(book_data_len(5), 179);
        assert_eq!(book_data_len(1), 51);
    }
}
