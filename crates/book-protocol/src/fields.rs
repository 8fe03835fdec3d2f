//! Typed decoding of a tokenized message.
//!
//! Both front ends (CSV lines and JSON arrays) reduce a message to an
//! ordered list of text fields; this module turns that list into a
//! [`MarketEvent`]. Every failure is counted in [`Stats`] exactly once,
//! here, before it is returned.
//!
//! Field checks, in wire order:
//! - order id `1..=MAX_ORDER_ID`
//! - side `B` / `S`
//! - order quantity `1..=MAX_ORDER_QUANTITY`, trade quantity `> 0`,
//!   snapshot level quantity `0..=MAX_ORDER_QUANTITY`
//! - order price `1..=MAX_ORDER_PRICE`, trade price `> 0`
//!
//! A missing field reads as empty and fails as a syntax error. Fields
//! past the end of an order message make it corrupt.

use book_core::messages::{MAX_ORDER_ID, MAX_ORDER_PRICE, MAX_ORDER_QUANTITY};
use book_core::{BookError, MarketEvent, Order, OrderId, Price, Quantity, Side, Snapshot, Stats, Trade};

use crate::wire_types::{
    ORDER_FIELDS, SIDE_UNKNOWN, SNAPSHOT_LEVEL_FIELDS, TAG_ADD, TAG_CANCEL, TAG_MODIFY,
    TAG_SNAPSHOT, TAG_TRADE, TRADE_FIELDS,
};

/// Decode one message from its fields, counting any failure.
pub fn decode_fields<T: AsRef<str>>(fields: &[T], stats: &Stats) -> Result<MarketEvent, BookError> {
    decode(fields).map_err(|err| {
        stats.record(err.category());
        err
    })
}

fn decode<T: AsRef<str>>(fields: &[T]) -> Result<MarketEvent, BookError> {
    let mut cursor = Cursor::new(fields);
    let tag = cursor.next();

    match tag {
        TAG_ADD => order(&mut cursor).map(MarketEvent::Add),
        TAG_MODIFY => order(&mut cursor).map(MarketEvent::Modify),
        TAG_CANCEL => order(&mut cursor).map(MarketEvent::Cancel),
        TAG_TRADE => trade(&mut cursor).map(MarketEvent::Trade),
        TAG_SNAPSHOT => snapshot(&mut cursor).map(MarketEvent::Snapshot),
        other => Err(BookError::CorruptEvent(format!("unknown event tag {other:?}"))),
    }
}

fn order<T: AsRef<str>>(cursor: &mut Cursor<'_, T>) -> Result<Order, BookError> {
    if cursor.remaining() > ORDER_FIELDS {
        return Err(BookError::CorruptEvent(format!(
            "order with {} fields after the tag",
            cursor.remaining()
        )));
    }
    let order_id = cursor
        .number(BookError::OrderIdParse)
        .and_then(|v| in_range(v, 1, MAX_ORDER_ID, BookError::OrderIdRange))?;
    let side = side(cursor.next())?;
    let quantity = cursor
        .number(BookError::QuantityParse)
        .and_then(|v| in_range(v, 1, MAX_ORDER_QUANTITY, BookError::QuantityRange))?;
    let price = cursor
        .number(BookError::PriceParse)
        .and_then(|v| in_range(v, 1, MAX_ORDER_PRICE, BookError::PriceRange))?;

    Ok(Order::new(order_id as OrderId, side, quantity as Quantity, price as Price))
}

fn trade<T: AsRef<str>>(cursor: &mut Cursor<'_, T>) -> Result<Trade, BookError> {
    let side = side(cursor.next())?;
    let quantity = cursor
        .number(BookError::QuantityParse)
        .and_then(|v| in_range(v, 1, Quantity::MAX, BookError::QuantityRange))?;
    let price = cursor
        .number(BookError::PriceParse)
        .and_then(|v| in_range(v, 1, Price::MAX, BookError::PriceRange))?;

    Ok(Trade::new(side, quantity as Quantity, price as Price))
}

/// `S, [bc, bq, bp, ac, aq, ap]*, [side, qty, price]`
fn snapshot<T: AsRef<str>>(cursor: &mut Cursor<'_, T>) -> Result<Snapshot, BookError> {
    let remaining = cursor.remaining();
    let has_trade = match remaining % SNAPSHOT_LEVEL_FIELDS {
        0 => false,
        TRADE_FIELDS => true,
        _ => {
            return Err(BookError::CorruptEvent(format!(
                "snapshot with {remaining} fields after the tag"
            )))
        }
    };

    let mut snapshot = Snapshot::default();
    for _ in 0..remaining / SNAPSHOT_LEVEL_FIELDS {
        for side in [Side::Bid, Side::Ask] {
            // Contributor count is informational; each level becomes one order.
            cursor.number(|raw| BookError::CorruptEvent(format!("snapshot count {raw:?}")))?;
            let quantity = cursor
                .number(BookError::QuantityParse)
                .and_then(|v| in_range(v, 0, MAX_ORDER_QUANTITY, BookError::QuantityRange))?;
            let price = cursor
                .number(BookError::PriceParse)
                .and_then(|v| in_range(v, 0, MAX_ORDER_PRICE, BookError::PriceRange))?;
            snapshot
                .orders
                .push(Order::snapshot_level(side, quantity as Quantity, price as Price));
        }
    }

    if has_trade {
        let side_field = cursor.peek();
        if side_field.is_empty() || side_field.starts_with(SIDE_UNKNOWN) {
            return Ok(snapshot);
        }
        snapshot.trade = Some(trade(cursor)?);
    }
    Ok(snapshot)
}

fn side(field: &str) -> Result<Side, BookError> {
    let mut chars = field.chars();
    match (chars.next().and_then(Side::from_char), chars.next()) {
        (Some(side), None) => Ok(side),
        _ => Err(BookError::SideParse(field.to_string())),
    }
}

fn in_range<T>(value: u64, low: T, high: T, err: fn(u64) -> BookError) -> Result<u64, BookError>
where
    u64: From<T>,
{
    if (u64::from(low)..=u64::from(high)).contains(&value) {
        Ok(value)
    } else {
        Err(err(value))
    }
}

/// Forward-only reader over the fields.
struct Cursor<'a, T> {
    fields: &'a [T],
    pos: usize,
}

impl<'a, T: AsRef<str>> Cursor<'a, T> {
    fn new(fields: &'a [T]) -> Self {
        Cursor { fields, pos: 0 }
    }

    fn peek(&self) -> &'a str {
        self.fields.get(self.pos).map_or("", |f| f.as_ref().trim())
    }

    /// Next field, or `""` once past the end.
    fn next(&mut self) -> &'a str {
        let field = self.peek();
        self.pos += 1;
        field
    }

    fn remaining(&self) -> usize {
        self.fields.len().saturating_sub(self.pos)
    }

    fn number(&mut self, err: impl FnOnce(String) -> BookError) -> Result<u64, BookError> {
        let field = self.next();
        field.parse::<u64>().map_err(|_| err(field.to_string()))
    }
}
