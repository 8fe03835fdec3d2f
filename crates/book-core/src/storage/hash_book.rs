//! `HashMap` storage: O(1) amortized writes, ordering paid on read.
//!
//! Every call to `sorted_bids` / `sorted_asks` rebuilds a temporary,
//! sorted vector of level references from scratch. Nothing is cached,
//! so a read always reflects the current levels.

use std::collections::HashMap;

use crate::messages::{OrderId, Price, Quantity};
use crate::side::Side;
use crate::storage::{BookStorage, LevelOrders};

/// Orders at one price, unordered.
pub type HashOrders = HashMap<OrderId, Quantity>;

#[derive(Debug, Default, Clone)]
pub struct HashBook {
    bids: HashMap<Price, HashOrders>,
    asks: HashMap<Price, HashOrders>,
}

impl HashBook {
    fn side(&self, side: Side) -> &HashMap<Price, HashOrders> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut HashMap<Price, HashOrders> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    fn materialize(levels: &HashMap<Price, HashOrders>) -> Vec<(Price, &HashOrders)> {
        levels.iter().map(|(price, orders)| (*price, orders)).collect()
    }
}

impl LevelOrders for HashMap<OrderId, Quantity> {
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
        HashMap::remove(self, &order_id)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn sum(&self) -> Quantity {
        self.values().fold(0, |acc: Quantity, q| acc.saturating_add(*q))
    }
}

impl BookStorage for HashBook {
    type Orders = HashOrders;

    fn top_bid(&self) -> Price {
        self.bids.keys().max().copied().unwrap_or(0)
    }

    fn top_ask(&self) -> Price {
        self.asks.keys().min().copied().unwrap_or(0)
    }

    fn sorted_bids(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        let mut sorted = Self::materialize(&self.bids);
        sorted.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        sorted.into_iter()
    }

    fn sorted_asks(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        let mut sorted = Self::materialize(&self.asks);
        sorted.sort_unstable_by_key(|(price, _)| *price);
        sorted.into_iter()
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
