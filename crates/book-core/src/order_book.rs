//! Single-instrument order book, written once over [`BookStorage`].
//!
//! The book does not match orders. It records the orders and trades it is
//! told about and checks the two streams against each other:
//! - Bids: best = highest price. Asks: best = lowest price.
//! - An add that crosses the opposite top registers a [`PendingMatch`];
//!   the next trade must be compatible with it.
//! - Every detected condition is counted in the shared [`Stats`] and
//!   returned as a [`BookError`]. None of them corrupts the book.
//!
//! Rendering ([`book_data`](OrderBook::book_data) and friends) always
//! builds a fresh [`BookData`]; nothing returned aliases live storage.

use std::sync::Arc;

use crate::book_data::{clamp_depth, BookData, LevelQuote, TradeSummary, DEFAULT_LEVELS};
use crate::error::BookError;
use crate::messages::{Event, MarketEvent, Order, OrderId, Price, Quantity, Snapshot, Trade};
use crate::side::Side;
use crate::stats::Stats;
use crate::storage::{BookStorage, LevelOrders, MapBook};

/// An add crossed the book; a trade is expected before any further crossing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PendingMatch {
    /// Price of the crossing order.
    pub price: Price,
    pub order_id: OrderId,
}

/// Trade quantities seen at the current traded price.
#[derive(Debug, Clone, Default)]
pub struct TotalTraded {
    side: Option<Side>,
    price: Price,
    quantities: Vec<Quantity>,
}

impl TotalTraded {
    /// Reset on a price change, then append.
    fn record(&mut self, trade: &Trade) {
        if trade.price != self.price {
            self.quantities.clear();
            self.price = trade.price;
            self.side = Some(trade.side);
        }
        self.quantities.push(trade.quantity);
    }

    /// Most recent individual trade at the current price.
    pub fn last(&self) -> TradeSummary {
        TradeSummary {
            side: self.side,
            quantity: self.quantities.last().copied().unwrap_or(0),
            price: self.price,
        }
    }

    /// Aggregate over every trade at the current price, saturating at
    /// `Quantity::MAX`.
    pub fn total(&self) -> TradeSummary {
        let sum: u64 = self.quantities.iter().map(|&q| u64::from(q)).sum();
        TradeSummary {
            side: self.side,
            quantity: Quantity::try_from(sum).unwrap_or(Quantity::MAX),
            price: self.price,
        }
    }

    pub fn count(&self) -> usize {
        self.quantities.len()
    }
}

/// What [`OrderBook::apply`] did; drives [`OrderBook::render`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Add, modify or cancel; carries the event tag.
    Order(Event),
    Trade,
    Snapshot { traded: bool },
}

#[derive(Debug)]
pub struct OrderBook<S: BookStorage = MapBook> {
    storage: S,
    traded: TotalTraded,
    pending: Option<PendingMatch>,
    stats: Arc<Stats>,
    /// Depth used by [`render`](OrderBook::render).
    depth: usize,
}

impl<S: BookStorage> Default for OrderBook<S> {
    fn default() -> Self {
        OrderBook::new()
    }
}

impl<S: BookStorage> OrderBook<S> {
    /// Book with its own, private statistics registry.
    pub fn new() -> Self {
        OrderBook::with_stats(Arc::new(Stats::new()))
    }

    /// Book that counts into a shared registry.
    pub fn with_stats(stats: Arc<Stats>) -> Self {
        OrderBook {
            storage: S::default(),
            traded: TotalTraded::default(),
            pending: None,
            stats,
            depth: DEFAULT_LEVELS,
        }
    }

    /// Set the render depth (clamped to `1..=MAX_LEVELS`).
    pub fn with_depth(mut self, levels: usize) -> Self {
        self.depth = clamp_depth(levels);
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn pending_match(&self) -> Option<PendingMatch> {
        self.pending
    }

    pub fn total_traded(&self) -> &TotalTraded {
        &self.traded
    }

    // ---- Event application ----

    /// Apply one decoded message.
    pub fn apply(&mut self, event: &MarketEvent) -> Result<Applied, BookError> {
        match event {
            MarketEvent::Add(order) => self.add(order).map(|_| Applied::Order(Event::Add)),
            MarketEvent::Modify(order) => self.modify(order).map(|_| Applied::Order(Event::Modify)),
            MarketEvent::Cancel(order) => self.cancel(order).map(|_| Applied::Order(Event::Cancel)),
            MarketEvent::Trade(trade) => self.trade(trade).map(|_| Applied::Trade),
            MarketEvent::Snapshot(snapshot) => self.snapshot(snapshot).map(|_| Applied::Snapshot {
                traded: snapshot.trade.is_some(),
            }),
        }
    }

    /// Apply, then render at the configured depth.
    pub fn process_event(&mut self, event: &MarketEvent) -> Result<Vec<BookData>, BookError> {
        let applied = self.apply(event)?;
        Ok(self.render(applied))
    }

    /// Insert a new resting order, then run the crossing check.
    ///
    /// A duplicate `(price, order id)` is rejected and the resting
    /// quantity is left as it was.
    pub fn add(&mut self, order: &Order) -> Result<(), BookError> {
        let duplicate = self
            .storage
            .level(order.side, order.price)
            .is_some_and(|level| level.contains(order.order_id));
        if duplicate {
            return Err(self.fail(BookError::DuplicateOrder {
                order_id: order.order_id,
                price: order.price,
            }));
        }

        *self
            .storage
            .level_mut(order.side, order.price)
            .quantity_mut(order.order_id) = order.quantity;

        self.check_cross(order)
    }

    /// Replace the resting quantity of an existing order.
    pub fn modify(&mut self, order: &Order) -> Result<(), BookError> {
        self.resting(order).map_err(|e| self.fail(e))?;
        *self
            .storage
            .level_mut(order.side, order.price)
            .quantity_mut(order.order_id) = order.quantity;
        Ok(())
    }

    /// Full or partial cancel. An emptied level is removed.
    pub fn cancel(&mut self, order: &Order) -> Result<(), BookError> {
        let resting = self.resting(order).map_err(|e| self.fail(e))?;

        let level = self.storage.level_mut(order.side, order.price);
        if order.quantity >= resting {
            level.remove(order.order_id);
            if level.is_empty() {
                self.storage.remove_level(order.side, order.price);
            }
        } else {
            *level.quantity_mut(order.order_id) = resting - order.quantity;
        }
        Ok(())
    }

    /// Record a trade and settle the pending match, if any.
    ///
    /// A trade that does not satisfy the pending match leaves it in place.
    pub fn trade(&mut self, trade: &Trade) -> Result<(), BookError> {
        self.traded.record(trade);

        let Some(pending) = self.pending else {
            return Ok(());
        };

        let compatible = match trade.side {
            Side::Ask => trade.price <= pending.price,
            Side::Bid => trade.price >= pending.price,
        };
        if compatible {
            self.pending = None;
            Ok(())
        } else {
            Err(self.fail(BookError::TradeDoesNotMatchOrder {
                pending,
                trade: *trade,
            }))
        }
    }

    /// Full refresh: clear, apply the carried trade, install every level.
    pub fn snapshot(&mut self, snapshot: &Snapshot) -> Result<(), BookError> {
        self.storage.clear();
        self.pending = None;

        if let Some(trade) = &snapshot.trade {
            self.trade(trade)?;
        }

        for order in &snapshot.orders {
            if order.price == 0 || order.quantity == 0 {
                continue;
            }
            *self
                .storage
                .level_mut(order.side, order.price)
                .quantity_mut(order.order_id) = order.quantity;
        }
        Ok(())
    }

    // ---- Queries ----

    pub fn top_bid(&self) -> Price {
        self.storage.top_bid()
    }

    pub fn top_ask(&self) -> Price {
        self.storage.top_ask()
    }

    /// `(top_ask + top_bid) / 2`, with a zero top taken at face value.
    pub fn mid(&self) -> f64 {
        (f64::from(self.top_ask()) + f64::from(self.top_bid())) / 2.0
    }

    // ---- Rendering ----

    /// Records to publish for a successfully applied message.
    pub fn render(&self, applied: Applied) -> Vec<BookData> {
        let depth = self.depth;
        match applied {
            Applied::Order(event) => vec![self.mid_data(depth), self.book_data(depth, event)],
            Applied::Trade => vec![self.trade_data(depth), self.mid_data(depth)],
            Applied::Snapshot { traded: true } => vec![self.trade_data(depth)],
            Applied::Snapshot { traded: false } => vec![self.book_data(depth, Event::Snapshot)],
        }
    }

    /// Up to `levels` levels per side, best first, zero-filled past the book.
    pub fn book_data(&self, levels: usize, event: Event) -> BookData {
        let mut data = BookData::new(levels, event);
        fill_levels(data.side_mut(Side::Bid), self.storage.sorted_bids());
        fill_levels(data.side_mut(Side::Ask), self.storage.sorted_asks());
        data
    }

    /// [`book_data`](Self::book_data) plus last and cumulative trade.
    pub fn trade_data(&self, levels: usize) -> BookData {
        let mut data = self.book_data(levels, Event::Trade);
        data.last_trade = self.traded.last();
        data.total_traded = self.traded.total();
        data
    }

    /// Top bid and ask prices in level 0, everything else zero.
    pub fn mid_data(&self, levels: usize) -> BookData {
        let mut data = BookData::new(levels, Event::Mid);
        data.side_mut(Side::Bid)[0] = LevelQuote::new(0, 0, self.top_bid());
        data.side_mut(Side::Ask)[0] = LevelQuote::new(0, 0, self.top_ask());
        data
    }

    // ---- Internal helpers ----

    /// Resting quantity of an existing order, or why it is not there.
    fn resting(&self, order: &Order) -> Result<Quantity, BookError> {
        let level = self
            .storage
            .level(order.side, order.price)
            .ok_or(BookError::MissingPriceLevel {
                side: order.side,
                price: order.price,
            })?;
        level.quantity(order.order_id).ok_or(BookError::MissingOrder {
            side: order.side,
            order_id: order.order_id,
            price: order.price,
        })
    }

    fn check_cross(&mut self, order: &Order) -> Result<(), BookError> {
        let opposite = self.storage.top(order.side.opposite());
        let crosses = opposite > 0
            && match order.side {
                Side::Bid => opposite <= order.price,
                Side::Ask => opposite >= order.price,
            };
        if !crosses {
            return Ok(());
        }

        match self.pending.take() {
            Some(pending) => Err(self.fail(BookError::CrossedWithoutTrade {
                pending,
                order_id: order.order_id,
                price: order.price,
            })),
            None => {
                self.pending = Some(PendingMatch {
                    price: order.price,
                    order_id: order.order_id,
                });
                Ok(())
            }
        }
    }

    fn fail(&self, err: BookError) -> BookError {
        self.stats.record(err.category());
        err
    }
}

fn fill_levels<'a, O: LevelOrders + 'a>(
    slots: &mut [LevelQuote],
    levels: impl Iterator<Item = (Price, &'a O)>,
) {
    for (slot, (price, orders)) in slots.iter_mut().zip(levels) {
        *slot = LevelQuote::new(orders.len() as u32, orders.sum(), price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ErrorCategory;
    use crate::storage::{HashBook, VectorBook};

    fn bid(id: OrderId, qty: Quantity, price: Price) -> Order {
        Order::new(id, Side::Bid, qty, price)
    }

    fn ask(id: OrderId, qty: Quantity, price: Price) -> Order {
        Order::new(id, Side::Ask, qty, price)
    }

    fn resting<S: BookStorage>(book: &OrderBook<S>, order: &Order) -> Option<Quantity> {
        book.storage()
            .level(order.side, order.price)
            .and_then(|level| level.quantity(order.order_id))
    }

    fn duplicate_add_keeps_original<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&bid(5, 10, 100)).unwrap();
        let err = book.add(&bid(5, 20, 100)).unwrap_err();

        assert!(matches!(err, BookError::DuplicateOrder { order_id: 5, price: 100 }));
        assert_eq!(resting(&book, &bid(5, 0, 100)), Some(10));
        assert_eq!(book.stats().count(ErrorCategory::DuplicateOrderId), 1);
    }

    fn modify_unknown_order_is_a_no_op<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&bid(1, 10, 100)).unwrap();

        let err = book.modify(&bid(999, 5, 100)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingOrder);
        assert_eq!(resting(&book, &bid(999, 0, 100)), None);

        let err = book.modify(&bid(1, 5, 101)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingPriceLevel);
        assert!(!book.storage().has_level(Side::Bid, 101));

        assert_eq!(book.stats().count(ErrorCategory::MissingOrder), 1);
        assert_eq!(book.stats().count(ErrorCategory::MissingPriceLevel), 1);
    }

    fn modify_replaces_quantity<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&ask(3, 10, 120)).unwrap();
        book.modify(&ask(3, 4, 120)).unwrap();
        assert_eq!(resting(&book, &ask(3, 0, 120)), Some(4));
    }

    fn partial_then_full_cancel<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&bid(1, 10, 100)).unwrap();
        book.add(&bid(2, 7, 100)).unwrap();

        book.cancel(&bid(1, 4, 100)).unwrap();
        assert_eq!(resting(&book, &bid(1, 0, 100)), Some(6));

        book.cancel(&bid(1, 6, 100)).unwrap();
        assert_eq!(resting(&book, &bid(1, 0, 100)), None);
        assert!(book.storage().has_level(Side::Bid, 100));

        book.cancel(&bid(2, 500, 100)).unwrap();
        assert!(!book.storage().has_level(Side::Bid, 100));
        assert!(book.storage().is_empty());
    }

    fn pending_match_lifecycle<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&ask(9, 10, 100)).unwrap();
        book.add(&bid(1, 10, 100)).unwrap();
        assert_eq!(
            book.pending_match(),
            Some(PendingMatch {
                price: 100,
                order_id: 1
            })
        );

        book.trade(&Trade::new(Side::Ask, 10, 100)).unwrap();
        assert_eq!(book.pending_match(), None);

        book.add(&bid(2, 10, 101)).unwrap();
        let err = book.trade(&Trade::new(Side::Ask, 10, 150)).unwrap_err();
        assert!(err.is_stream_integrity());
        assert_eq!(err.category(), ErrorCategory::NoOrderForTrade);
        assert!(book.pending_match().is_some());
    }

    fn second_cross_while_pending<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        book.add(&ask(9, 10, 100)).unwrap();
        book.add(&bid(1, 10, 100)).unwrap();

        let err = book.add(&bid(2, 5, 105)).unwrap_err();
        assert!(matches!(err, BookError::CrossedWithoutTrade { order_id: 2, .. }));
        assert_eq!(book.pending_match(), None);
        assert_eq!(resting(&book, &bid(2, 0, 105)), Some(5));
        assert_eq!(book.stats().count(ErrorCategory::CrossedWithoutTrade), 1);
    }

    fn render_zero_fills_and_truncates<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        for (i, price) in [100, 99, 98, 97, 96, 95, 94].into_iter().enumerate() {
            book.add(&bid(i as OrderId + 1, 10, price)).unwrap();
        }
        book.add(&bid(50, 5, 100)).unwrap();
        book.add(&ask(60, 3, 110)).unwrap();

        let data = book.book_data(5, Event::Add);
        let prices: Vec<f64> = data.bids().iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![100.0, 99.0, 98.0, 97.0, 96.0]);
        assert_eq!(data.bids()[0], LevelQuote::new(2, 15, 100));
        assert_eq!(data.asks()[0], LevelQuote::new(1, 3, 110));
        assert!(data.asks()[1..].iter().all(LevelQuote::is_empty));
    }

    macro_rules! for_each_storage {
        ($($name:ident),* $(,)?) => {
            mod map { $(#[test] fn $name() { super::$name::<crate::storage::MapBook>() })* }
            mod hash { $(#[test] fn $name() { super::$name::<super::HashBook>() })* }
            mod vector { $(#[test] fn $name() { super::$name::<super::VectorBook>() })* }
        };
    }

    fn level_sum_saturates<S: BookStorage>() {
        let mut book = OrderBook::<S>::new();
        let snapshot = Snapshot {
            orders: vec![Order::snapshot_level(Side::Bid, Quantity::MAX - 10, 100)],
            trade: None,
        };
        book.snapshot(&snapshot).unwrap();
        book.add(&bid(1, 500, 100)).unwrap();

        let data = book.book_data(1, Event::Add);
        assert_eq!(data.bids()[0], LevelQuote::new(2, Quantity::MAX, 100));
    }

    for_each_storage!(
        level_sum_saturates,
        duplicate_add_keeps_original,
        modify_unknown_order_is_a_no_op,
        modify_replaces_quantity,
        partial_then_full_cancel,
        pending_match_lifecycle,
        second_cross_while_pending,
        render_zero_fills_and_truncates,
    );

    #[test]
    fn total_traded_resets_on_price_change() {
        let mut book = OrderBook::<MapBook>::new();
        book.trade(&Trade::new(Side::Bid, 5, 100)).unwrap();
        book.trade(&Trade::new(Side::Ask, 7, 100)).unwrap();

        let data = book.trade_data(1);
        assert_eq!(data.event, Event::Trade);
        assert_eq!(data.last_trade.quantity, 7);
        assert_eq!(data.total_traded.quantity, 12);
        assert_eq!(data.total_traded.side, Some(Side::Bid));

        book.trade(&Trade::new(Side::Ask, 3, 101)).unwrap();
        let total = book.total_traded().total();
        assert_eq!((total.side, total.quantity, total.price), (Some(Side::Ask), 3, 101));
        assert_eq!(book.total_traded().count(), 1);
    }

    #[test]
    fn total_traded_saturates() {
        let mut book = OrderBook::<MapBook>::new();
        book.trade(&Trade::new(Side::Bid, 3_000_000_000, 100)).unwrap();
        book.trade(&Trade::new(Side::Bid, 3_000_000_000, 100)).unwrap();

        let data = book.trade_data(1);
        assert_eq!(data.last_trade.quantity, 3_000_000_000);
        assert_eq!(data.total_traded.quantity, Quantity::MAX);
        assert_eq!(book.total_traded().count(), 2);
    }

    #[test]
    fn mid_uses_raw_tops() {
        let mut book = OrderBook::<MapBook>::new();
        book.add(&bid(1, 10, 100)).unwrap();
        assert_eq!(book.mid(), 50.0);
        book.add(&ask(2, 10, 104)).unwrap();
        assert_eq!(book.mid(), 102.0);

        let data = book.mid_data(5);
        assert_eq!(data.event, Event::Mid);
        assert_eq!(data.bids()[0], LevelQuote::new(0, 0, 100));
        assert_eq!(data.asks()[0], LevelQuote::new(0, 0, 104));
        assert!(data.bids()[1..].iter().all(LevelQuote::is_empty));
    }

    #[test]
    fn render_policy_per_event() {
        let mut book = OrderBook::<MapBook>::new().with_depth(3);

        let out = book.process_event(&MarketEvent::Add(bid(1, 10, 100))).unwrap();
        let events: Vec<Event> = out.iter().map(|d| d.event).collect();
        assert_eq!(events, vec![Event::Mid, Event::Add]);
        assert_eq!(out[1].depth(), 3);

        let out = book
            .process_event(&MarketEvent::Trade(Trade::new(Side::Bid, 1, 100)))
            .unwrap();
        let events: Vec<Event> = out.iter().map(|d| d.event).collect();
        assert_eq!(events, vec![Event::Trade, Event::Mid]);

        let out = book
            .process_event(&MarketEvent::Snapshot(Snapshot::default()))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event, Event::Snapshot);
    }

    #[test]
    fn failed_event_renders_nothing_and_counts_once() {
        let stats = Arc::new(Stats::new());
        let mut book = OrderBook::<HashBook>::with_stats(Arc::clone(&stats));

        assert!(book.process_event(&MarketEvent::Cancel(bid(4, 1, 100))).is_err());
        assert_eq!(stats.count(ErrorCategory::MissingPriceLevel), 1);
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn snapshot_is_a_full_refresh_and_idempotent() {
        let mut book = OrderBook::<VectorBook>::new();
        book.add(&bid(77, 1, 90)).unwrap();

        let snapshot = Snapshot {
            orders: vec![
                Order::snapshot_level(Side::Bid, 10, 100),
                Order::snapshot_level(Side::Ask, 12, 102),
                Order::snapshot_level(Side::Bid, 0, 0),
            ],
            trade: Some(Trade::new(Side::Ask, 4, 101)),
        };

        let first = book.process_event(&MarketEvent::Snapshot(snapshot.clone())).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].event, Event::Trade);
        assert!(!book.storage().has_level(Side::Bid, 90));
        assert_eq!(book.storage().level_count(Side::Bid), 1);

        book.snapshot(&snapshot).unwrap();
        let data = book.book_data(2, Event::Snapshot);
        assert_eq!(data.bids()[0], LevelQuote::new(1, 10, 100));
        assert_eq!(data.asks()[0], LevelQuote::new(1, 12, 102));
        assert!(data.bids()[1].is_empty());
        assert_eq!(book.total_traded().total().quantity, 8);
    }
}
