//! Message types consumed by the order book.
//!
//! These are **transport-agnostic** logical events:
//! - [`MarketEvent`]: one decoded wire message.
//! - [`Order`], [`Trade`], [`Snapshot`]: the payloads.
//! - [`Event`]: the tag carried by every rendered [`BookData`](crate::BookData).
//!
//! Note: CSV / JSON decoders live in the `book-protocol` crate;
//! this module is purely logical.

use crate::side::Side;

/// Price level key in integer ticks. `0` means "no level".
pub type Price = u32;

/// Resting or traded quantity.
pub type Quantity = u32;

/// Exchange order identifier.
pub type OrderId = u32;

/// Highest order id accepted on the wire.
pub const MAX_ORDER_ID: OrderId = 100_000_000;

/// Highest order quantity accepted on the wire.
pub const MAX_ORDER_QUANTITY: Quantity = 500;

/// Highest order price accepted on the wire.
pub const MAX_ORDER_PRICE: Price = 2000;

/// Base of synthetic bid order ids installed by a snapshot.
pub const SNAPSHOT_BID_ID_BASE: OrderId = 1_000_000;

/// Base of synthetic ask order ids installed by a snapshot.
pub const SNAPSHOT_ASK_ID_BASE: OrderId = 2_000_000;

/// Event that caused a snapshot to be rendered.
///
/// `Mid` never comes off the wire; it only tags mid-price renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Event {
    Add,
    Modify,
    Cancel,
    Trade,
    Mid,
    Snapshot,
    #[default]
    Unknown,
}

impl Event {
    /// Single char tag, as used by the binary record.
    pub fn as_char(self) -> char {
        match self {
            Event::Add => 'A',
            Event::Modify => 'M',
            Event::Cancel => 'X',
            Event::Trade => 'T',
            Event::Mid => 'D',
            Event::Snapshot => 'S',
            Event::Unknown => 'U',
        }
    }

    /// Decode a binary record tag. Unrecognised chars map to `Unknown`.
    pub fn from_char(c: char) -> Self {
        match c {
            'A' => Event::Add,
            'M' => Event::Modify,
            'X' => Event::Cancel,
            'T' => Event::Trade,
            'D' => Event::Mid,
            'S' => Event::Snapshot,
            _ => Event::Unknown,
        }
    }
}

/// Order properties extracted from an Add / Modify / Cancel event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: OrderId,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
}

impl Order {
    pub fn new(order_id: OrderId, side: Side, quantity: Quantity, price: Price) -> Self {
        Order {
            order_id,
            side,
            quantity,
            price,
        }
    }

    /// Synthetic order standing for a whole snapshot level.
    ///
    /// The id depends only on side and price, so installing the same
    /// level twice lands on the same resting order.
    pub fn snapshot_level(side: Side, quantity: Quantity, price: Price) -> Self {
        let base = match side {
            Side::Bid => SNAPSHOT_BID_ID_BASE,
            Side::Ask => SNAPSHOT_ASK_ID_BASE,
        };
        Order::new(base + price, side, quantity, price)
    }
}

/// Externally reported trade.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Trade {
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
}

impl Trade {
    pub fn new(side: Side, quantity: Quantity, price: Price) -> Self {
        Trade {
            side,
            quantity,
            price,
        }
    }
}

/// A full book refresh: one synthetic order per level plus an optional trade.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub trade: Option<Trade>,
}

/// One decoded market data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    Add(Order),
    Modify(Order),
    Cancel(Order),
    Trade(Trade),
    Snapshot(Snapshot),
}

impl MarketEvent {
    /// The rendering tag for this message.
    pub fn event(&self) -> Event {
        match self {
            MarketEvent::Add(_) => Event::Add,
            MarketEvent::Modify(_) => Event::Modify,
            MarketEvent::Cancel(_) => Event::Cancel,
            MarketEvent::Trade(_) => Event::Trade,
            MarketEvent::Snapshot(_) => Event::Snapshot,
        }
    }
}
