//! `BTreeMap` storage: levels are kept in price order on every write.
//!
//! `bids[price][order_id] <- quantity`, same for asks. Both maps are
//! ascending; the best bid is the last key, the best ask the first.

use std::collections::BTreeMap;

use crate::messages::{OrderId, Price, Quantity};
use crate::side::Side;
use crate::storage::{BookStorage, LevelOrders};

/// Orders at one price, ordered by id.
pub type MapOrders = BTreeMap<OrderId, Quantity>;

#[derive(Debug, Default, Clone)]
pub struct MapBook {
    bids: BTreeMap<Price, MapOrders>,
    asks: BTreeMap<Price, MapOrders>,
}

impl MapBook {
    fn side(&self, side: Side) -> &BTreeMap<Price, MapOrders> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, MapOrders> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}

impl LevelOrders for BTreeMap<OrderId, Quantity> {
    fn contains(&self, order_id: OrderId) -> bool {
        self.contains_key(&order_id)
    }

    fn quantity(&self, order_id: OrderId) -> Option<Quantity> {
        self.get(&order_id).copied()
    }

    fn quantity_mut(&mut self, order_id: OrderId) -> &mut Quantity {
        self.entry(order_id).or_insert(0)
    }

    fn remove(&mut self, order_id: OrderId) -> Option<Quantity> {
        BTreeMap::remove(self, &order_id)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn sum(&self) -> Quantity {
        self.values().fold(0, |acc: Quantity, q| acc.saturating_add(*q))
    }
}

impl BookStorage for MapBook {
    type Orders = MapOrders;

    fn top_bid(&self) -> Price {
        self.bids.keys().next_back().copied().unwrap_or(0)
    }

    fn top_ask(&self) -> Price {
        self.asks.keys().next().copied().unwrap_or(0)
    }

    fn sorted_bids(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        self.bids.iter().rev().map(|(price, orders)| (*price, orders))
    }

    fn sorted_asks(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        self.asks.iter().map(|(price, orders)| (*price, orders))
    }

    fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    fn has_level(&self, side: Side, price: Price) -> bool {
        self.side(side).contains_key(&price)
    }

    fn level(&self, side: Side, price: Price) -> Option<&Self::Orders> {
        self.side(side).get(&price)
    }

    fn level_mut(&mut self, side: Side, price: Price) -> &mut Self::Orders {
        self.side_mut(side).entry(price).or_default()
    }

    fn remove_level(&mut self, side: Side, price: Price) -> Option<Self::Orders> {
        self.side_mut(side).remove(&price)
    }

    fn level_count(&self, side: Side) -> usize {
        self.side(side).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_of_book_follows_ordering_rule() {
        let mut book = MapBook::default();
        assert_eq!(book.top_bid(), 0);
        assert_eq!(book.top_ask(), 0);

        for price in [100, 105, 98] {
            *book.level_mut(Side::Bid, price).quantity_mut(1) = 10;
            *book.level_mut(Side::Ask, price + 10).quantity_mut(2) = 10;
        }

        assert_eq!(book.top_bid(), 105);
        assert_eq!(book.top_ask(), 108);

        let bids: Vec<Price> = book.sorted_bids().map(|(p, _)| p).collect();
        let asks: Vec<Price> = book.sorted_asks().map(|(p, _)| p).collect();
        assert_eq!(bids, vec![105, 100, 98]);
        assert_eq!(asks, vec![108, 110, 115]);
    }

    #[test]
    fn index_creates_with_zero_quantity() {
        let mut book = MapBook::default();
        assert!(!book.has_level(Side::Bid, 100));

        let level = book.level_mut(Side::Bid, 100);
        assert_eq!(*level.quantity_mut(7), 0);
        assert!(level.contains(7));
        assert!(book.has_level(Side::Bid, 100));
    }

    #[test]
    fn clear_drops_both_sides() {
        let mut book = MapBook::default();
        *book.level_mut(Side::Bid, 100).quantity_mut(1) = 5;
        *book.level_mut(Side::Ask, 101).quantity_mut(2) = 5;
        book.clear();
        assert!(book.is_empty());
    }
}
