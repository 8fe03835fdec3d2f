//! Error types for the order book and its decoders.
//!
//! Every variant is scoped to a single input message: the caller logs
//! it and moves on to the next message. None of them is process-fatal.
//!
//! Two variants are stream-integrity failures rather than bad fields:
//! they mean the order and trade streams disagree with each other.

use thiserror::Error;

use crate::messages::{OrderId, Price, Trade};
use crate::order_book::PendingMatch;
use crate::side::Side;
use crate::stats::ErrorCategory;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("corrupt event: {0}")]
    CorruptEvent(String),

    #[error("duplicate order id {order_id} at price {price}")]
    DuplicateOrder { order_id: OrderId, price: Price },

    #[error("no {side:?} price level at {price}")]
    MissingPriceLevel { side: Side, price: Price },

    #[error("no order id {order_id} at {side:?} price {price}")]
    MissingOrder {
        side: Side,
        order_id: OrderId,
        price: Price,
    },

    #[error("order id {0} out of range")]
    OrderIdRange(u64),

    #[error("order id syntax: {0:?}")]
    OrderIdParse(String),

    #[error("side syntax: {0:?}")]
    SideParse(String),

    #[error("quantity {0} out of range")]
    QuantityRange(u64),

    #[error("quantity syntax: {0:?}")]
    QuantityParse(String),

    #[error("price {0} out of range")]
    PriceRange(u64),

    #[error("price syntax: {0:?}")]
    PriceParse(String),

    /// A crossing order arrived before the trade expected for `pending`.
    #[error("no trade matching order: order {order_id}@{price} crossed while {pending:?} awaited a trade")]
    CrossedWithoutTrade {
        pending: PendingMatch,
        order_id: OrderId,
        price: Price,
    },

    /// A trade arrived that cannot be the one expected for `pending`.
    #[error("no order matching trade: {trade:?} does not satisfy {pending:?}")]
    TradeDoesNotMatchOrder { pending: PendingMatch, trade: Trade },
}

impl BookError {
    /// Statistics category this error is counted under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BookError::CorruptEvent(_) => ErrorCategory::CorruptEvent,
            BookError::DuplicateOrder { .. } => ErrorCategory::DuplicateOrderId,
            BookError::MissingPriceLevel { .. } => ErrorCategory::MissingPriceLevel,
            BookError::MissingOrder { .. } => ErrorCategory::MissingOrder,
            BookError::OrderIdRange(_) => ErrorCategory::OrderIdRange,
            BookError::OrderIdParse(_) => ErrorCategory::OrderIdParse,
            BookError::SideParse(_) => ErrorCategory::SideParse,
            BookError::QuantityRange(_) => ErrorCategory::QuantityRange,
            BookError::QuantityParse(_) => ErrorCategory::QuantityParse,
            BookError::PriceRange(_) => ErrorCategory::PriceRange,
            BookError::PriceParse(_) => ErrorCategory::PriceParse,
            BookError::CrossedWithoutTrade { .. } => ErrorCategory::CrossedWithoutTrade,
            BookError::TradeDoesNotMatchOrder { .. } => ErrorCategory::NoOrderForTrade,
        }
    }

    /// True when the order and trade streams contradict each other,
    /// as opposed to a single malformed or unknown field.
    pub fn is_stream_integrity(&self) -> bool {
        matches!(
            self,
            BookError::CrossedWithoutTrade { .. } | BookError::TradeDoesNotMatchOrder { .. }
        )
    }
}
