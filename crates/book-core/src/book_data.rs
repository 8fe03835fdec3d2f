//! Fixed-shape, independently owned book snapshots.
//!
//! A [`BookData`] is rendered fresh on every call and handed to a
//! publisher by value. It is `Copy` and holds no reference into the
//! live book, so a consumer thread can read it while the next event
//! mutates the book.
//!
//! The level arrays always have [`MAX_LEVELS`] slots; `depth` says how
//! many of them were requested. Slots past the current book depth stay
//! zero-filled.

use crate::messages::{Event, Price, Quantity};
use crate::side::Side;

/// Hard cap on rendered depth.
pub const MAX_LEVELS: usize = 20;

/// Depth used when none is configured.
pub const DEFAULT_LEVELS: usize = 5;

/// Clamp a requested depth into `1..=MAX_LEVELS`.
pub fn clamp_depth(levels: usize) -> usize {
    levels.clamp(1, MAX_LEVELS)
}

/// One rendered price level.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LevelQuote {
    /// Number of orders aggregated into this level.
    pub contributors: u32,
    /// Aggregate resting quantity.
    pub quantity: Quantity,
    /// Level price; `0.0` for an absent level.
    pub price: f64,
}

impl LevelQuote {
    pub fn new(contributors: u32, quantity: Quantity, price: Price) -> Self {
        LevelQuote {
            contributors,
            quantity,
            price: f64::from(price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contributors == 0 && self.quantity == 0 && self.price == 0.0
    }
}

/// Trade fields carried by a snapshot (last trade or cumulative).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TradeSummary {
    /// `None` until a trade has been seen.
    pub side: Option<Side>,
    pub quantity: Quantity,
    pub price: Price,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BookData {
    depth: usize,
    bids: [LevelQuote; MAX_LEVELS],
    asks: [LevelQuote; MAX_LEVELS],
    /// Most recent individual trade.
    pub last_trade: TradeSummary,
    /// Sum of all trade quantities at the last traded price.
    pub total_traded: TradeSummary,
    /// Event that caused this render.
    pub event: Event,
}

impl BookData {
    /// Zero-filled record of the given depth (clamped to `1..=MAX_LEVELS`).
    pub fn new(depth: usize, event: Event) -> Self {
        BookData {
            depth: clamp_depth(depth),
            bids: [LevelQuote::default(); MAX_LEVELS],
            asks: [LevelQuote::default(); MAX_LEVELS],
            last_trade: TradeSummary::default(),
            total_traded: TradeSummary::default(),
            event,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bid levels, best first, exactly `depth` entries.
    pub fn bids(&self) -> &[LevelQuote] {
        &self.bids[..self.depth]
    }

    /// Ask levels, best first, exactly `depth` entries.
    pub fn asks(&self) -> &[LevelQuote] {
        &self.asks[..self.depth]
    }

    /// Mutable access to one side's levels, `depth` entries.
    pub fn side_mut(&mut self, side: Side) -> &mut [LevelQuote] {
        match side {
            Side::Bid => &mut self.bids[..self.depth],
            Side::Ask => &mut self.asks[..self.depth],
        }
    }

    /// Best bid price in the record (level 0).
    pub fn top_bid(&self) -> f64 {
        self.bids[0].price
    }

    /// Best ask price in the record (level 0).
    pub fn top_ask(&self) -> f64 {
        self.asks[0].price
    }

    /// Mid of the rendered top of book; `0.0` unless both sides are present.
    pub fn mid(&self) -> f64 {
        if self.top_bid() > 0.0 && self.top_ask() > 0.0 {
            (self.top_bid() + self.top_ask()) / 2.0
        } else {
            0.0
        }
    }
}

impl Default for BookData {
    fn default() -> Self {
        BookData::new(DEFAULT_LEVELS, Event::Unknown)
    }
}
