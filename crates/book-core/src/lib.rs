//! book-core
//!
//! Order book maintenance, no I/O:
//! - messages (decoded market events)
//! - price-level storage (map / hash / vector variants)
//! - per-instrument order book with the pending-match monitor
//! - fixed-shape book snapshots
//! - error taxonomy and statistics

pub mod side;
pub mod messages;
pub mod storage;
pub mod order_book;
pub mod book_data;
pub mod error;
pub mod stats;

pub use side::Side;

pub use messages::{
    Event,
    MarketEvent,
    Order,
    OrderId,
    Price,
    Quantity,
    Snapshot,
    Trade,
};

pub use book_data::{BookData, LevelQuote, TradeSummary, DEFAULT_LEVELS, MAX_LEVELS};
pub use error::BookError;
pub use order_book::{Applied, OrderBook, PendingMatch, TotalTraded};
pub use stats::{ErrorCategory, Stats};
pub use storage::{BookStorage, HashBook, LevelOrders, MapBook, StorageKind, VectorBook};
