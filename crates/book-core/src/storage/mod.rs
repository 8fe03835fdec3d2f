//! Price-level storage behind the order book.
//!
//! The book is written once against [`BookStorage`]; three variants
//! trade insert cost against read cost differently:
//!
//! - [`MapBook`]: `BTreeMap` levels, ordered on write, no sort step.
//! - [`HashBook`]: `HashMap` levels, O(1) writes, sorted on every read.
//! - [`VectorBook`]: parallel vectors, linear search on write, contiguous
//!   quantities summed lane by lane.
//!
//! Semantics shared by all three:
//! - Bids are ordered highest price first, asks lowest price first.
//! - `level_mut` / `quantity_mut` create a missing level / order with zero
//!   quantity; use `has_level` / `contains` first when absence matters.
//! - An empty level is never left behind by the order book (it removes
//!   levels eagerly), but the storage itself does not enforce that.

mod hash_book;
mod map_book;
mod vector_book;

use std::fmt;
use std::str::FromStr;

pub use hash_book::HashBook;
pub use map_book::MapBook;
pub use vector_book::{VectorBook, VectorLevels, VectorOrders};

use crate::messages::{OrderId, Price, Quantity};
use crate::side::Side;

/// The resting orders at one price: order id -> quantity.
pub trait LevelOrders: Default + Clone {
    /// Is this order id resting here?
    fn contains(&self, order_id: OrderId) -> bool;

    /// Resting quantity, if the order exists.
    fn quantity(&self, order_id: OrderId) -> Option<Quantity>;

    /// Index-and-create: a missing order is inserted with zero quantity.
    fn quantity_mut(&mut self, order_id: OrderId) -> &mut Quantity;

    /// Remove an order, returning its resting quantity.
    fn remove(&mut self, order_id: OrderId) -> Option<Quantity>;

    /// Number of resting orders (the rendered contributor count).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate resting quantity.
    fn sum(&self) -> Quantity;
}

/// Both sides of one book.
pub trait BookStorage: Default {
    type Orders: LevelOrders;

    /// Best (highest) bid price, `0` if there are no bids.
    fn top_bid(&self) -> Price;

    /// Best (lowest) ask price, `0` if there are no asks.
    fn top_ask(&self) -> Price;

    /// All bid levels, highest price first.
    fn sorted_bids(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_;

    /// All ask levels, lowest price first.
    fn sorted_asks(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_;

    /// Drop every level on both sides.
    fn clear(&mut self);

    fn has_level(&self, side: Side, price: Price) -> bool;

    fn level(&self, side: Side, price: Price) -> Option<&Self::Orders>;

    /// Index-and-create: a missing level is inserted empty.
    fn level_mut(&mut self, side: Side, price: Price) -> &mut Self::Orders;

    fn remove_level(&mut self, side: Side, price: Price) -> Option<Self::Orders>;

    /// Number of price levels on one side.
    fn level_count(&self, side: Side) -> usize;

    fn is_empty(&self) -> bool {
        self.level_count(Side::Bid) == 0 && self.level_count(Side::Ask) == 0
    }

    /// Best price on one side.
    fn top(&self, side: Side) -> Price {
        match side {
            Side::Bid => self.top_bid(),
            Side::Ask => self.top_ask(),
        }
    }
}

/// Storage variant selected at configuration time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Map,
    Hash,
    Vector,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Map => "map",
            StorageKind::Hash => "hash",
            StorageKind::Vector => "vector",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" | "M" => Ok(StorageKind::Map),
            "hash" | "H" => Ok(StorageKind::Hash),
            "vector" | "V" => Ok(StorageKind::Vector),
            other => Err(format!("unknown storage kind {other:?} (expected map, hash or vector)")),
        }
    }
}
