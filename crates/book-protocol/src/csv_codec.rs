//! CSV codec.
//!
//! Input format (one line → [`MarketEvent`]):
//!
//! - Add / Modify / Cancel:
//!   `A|M|X, orderId, side(B or S), quantity, price`
//!
//! - Trade:
//!   `T, side, quantity, price`
//!
//! - Snapshot:
//!   `S, [bidCount, bidQty, bidPrice, askCount, askQty, askPrice]*, [side, qty, price]`
//!
//! Output format ([`BookData`] → line), one row per record:
//!
//! - Book:  `S,U,0,0,` then per level `bidCount,bidQty,bidPrice,askPrice,askQty,askCount,`
//! - Trade: `S,side,lastQty,lastPrice,` then the same levels
//! - Mid:   nothing

use book_core::{BookData, BookError, Event, MarketEvent, Stats};

use crate::fields::decode_fields;
use crate::wire_types::SIDE_UNKNOWN;

/// Parse a single CSV line.
///
/// Returns `None` for blank lines or comments (starting with `#`).
/// Decoding failures are counted in `stats`.
pub fn parse_input_line(line: &str, stats: &Stats) -> Option<Result<MarketEvent, BookError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let tokens = split_and_trim(trimmed, ',');
    Some(decode_fields(&tokens, stats))
}

/// Format one record as a CSV row (including the trailing newline).
///
/// Mid records have no CSV form and format as an empty string.
pub fn format_book_data(data: &BookData) -> String {
    match data.event {
        Event::Mid => String::new(),
        Event::Trade => {
            let last = data.last_trade;
            let side = last.side.map_or(SIDE_UNKNOWN, |s| s.as_char());
            let mut row = format!("S,{},{},{},", side, last.quantity, last.price);
            push_levels(&mut row, data);
            row
        }
        _ => {
            let mut row = String::from("S,U,0,0,");
            push_levels(&mut row, data);
            row
        }
    }
}

fn push_levels(row: &mut String, data: &BookData) {
    use std::fmt::Write;

    for (bid, ask) in data.bids().iter().zip(data.asks()) {
        // Writing to a String cannot fail.
        let _ = write!(
            row,
            "{},{},{:.2},{:.2},{},{},",
            bid.contributors, bid.quantity, bid.price, ask.price, ask.quantity, ask.contributors
        );
    }
    row.push('\n');
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

pub fn split_and_trim(s: &str, delimiter: char) -> Vec<&str> {
    s.split(delimiter).map(str::trim).collect()
}
