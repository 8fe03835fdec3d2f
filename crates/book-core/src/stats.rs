//! Process-wide error statistics.
//!
//! One counter per [`ErrorCategory`]. A single [`Stats`] is built at
//! start-up and shared as `Arc<Stats>` by the decoders, every order book
//! and the host, then read once at shutdown for the summary.
//!
//! Counters are atomics with relaxed ordering: the single ingestion
//! thread never contends, and parallel per-instrument ingestion stays
//! correct without a lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Every recognised failure category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unrecognised event tag or structurally corrupt message.
    CorruptEvent,
    /// Add for an `(price, order id)` that is already resting.
    DuplicateOrderId,
    /// Modify / cancel at a price with no level.
    MissingPriceLevel,
    /// Modify / cancel for an order id not resting at that price.
    MissingOrder,
    /// A trade arrived that does not satisfy the pending match.
    NoOrderForTrade,
    /// A crossing order arrived while an expected trade was still outstanding.
    CrossedWithoutTrade,
    OrderIdRange,
    OrderIdParse,
    SideParse,
    QuantityRange,
    QuantityParse,
    PriceRange,
    PriceParse,
}

impl ErrorCategory {
    pub const COUNT: usize = 13;

    pub const ALL: [ErrorCategory; ErrorCategory::COUNT] = [
        ErrorCategory::CorruptEvent,
        ErrorCategory::DuplicateOrderId,
        ErrorCategory::MissingPriceLevel,
        ErrorCategory::MissingOrder,
        ErrorCategory::NoOrderForTrade,
        ErrorCategory::CrossedWithoutTrade,
        ErrorCategory::OrderIdRange,
        ErrorCategory::OrderIdParse,
        ErrorCategory::SideParse,
        ErrorCategory::QuantityRange,
        ErrorCategory::QuantityParse,
        ErrorCategory::PriceRange,
        ErrorCategory::PriceParse,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Label used in the printed summary.
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::CorruptEvent => "Corrupt event",
            ErrorCategory::DuplicateOrderId => "Duplicate order id",
            ErrorCategory::MissingPriceLevel => "Missing price level",
            ErrorCategory::MissingOrder => "No order id with cancel or modify",
            ErrorCategory::NoOrderForTrade => "No order matching trade",
            ErrorCategory::CrossedWithoutTrade => "No matching trade with order",
            ErrorCategory::OrderIdRange => "Order range",
            ErrorCategory::OrderIdParse => "Order syntax",
            ErrorCategory::SideParse => "Side error",
            ErrorCategory::QuantityRange => "Quantity range",
            ErrorCategory::QuantityParse => "Quantity syntax",
            ErrorCategory::PriceRange => "Price range",
            ErrorCategory::PriceParse => "Price syntax",
        }
    }
}

/// Counter registry, one slot per [`ErrorCategory`].
#[derive(Debug, Default)]
pub struct Stats {
    counters: [AtomicU64; ErrorCategory::COUNT],
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    /// Count one occurrence.
    pub fn record(&self, category: ErrorCategory) {
        self.counters[category.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Current count for one category.
    pub fn count(&self, category: ErrorCategory) -> u64 {
        self.counters[category.index()].load(Ordering::Relaxed)
    }

    /// Sum over all categories.
    pub fn total(&self) -> u64 {
        ErrorCategory::ALL.iter().map(|c| self.count(*c)).sum()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error summary")?;
        for category in ErrorCategory::ALL {
            writeln!(f, "{}:{:>3}", category.label(), self.count(category))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_slot_once() {
        for (i, c) in ErrorCategory::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn record_and_count() {
        let stats = Stats::new();
        stats.record(ErrorCategory::DuplicateOrderId);
        stats.record(ErrorCategory::DuplicateOrderId);
        stats.record(ErrorCategory::PriceRange);

        assert_eq!(stats.count(ErrorCategory::DuplicateOrderId), 2);
        assert_eq!(stats.count(ErrorCategory::PriceRange), 1);
        assert_eq!(stats.count(ErrorCategory::MissingOrder), 0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn summary_has_one_line_per_category() {
        let stats = Stats::new();
        stats.record(ErrorCategory::CorruptEvent);
        let text = stats.to_string();

        assert!(text.starts_with("Error summary\n"));
        assert!(text.contains("Corrupt event:  1\n"));
        assert!(text.contains("Price syntax:  0\n"));
        assert_eq!(text.lines().count(), 1 + ErrorCategory::COUNT);
    }
}
