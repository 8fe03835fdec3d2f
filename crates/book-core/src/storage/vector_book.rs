//! Contiguous-vector storage.
//!
//! Each side keeps two parallel vectors: `prices[i]` is the key of
//! `levels[i]`. Each level keeps two more: `order_ids[i]` is the key of
//! `quantities[i]`. Lookups are linear scans, inserts append, removals
//! shift. In exchange all quantities of a level sit in one contiguous
//! buffer, which [`lane_sum`] adds in fixed-width groups the compiler can
//! turn into vector instructions.

use std::mem::size_of;

use crate::messages::{OrderId, Price, Quantity};
use crate::side::Side;
use crate::storage::{BookStorage, LevelOrders};

/// Lanes per group: one 256-bit register worth of quantities
/// (8 for `u32`, 16 for `u16`, 4 for `u64`).
pub const LANES: usize = 32 / size_of::<Quantity>();

/// Sum quantities in groups of [`LANES`], then the tail one by one.
///
/// Lanes accumulate in `u64`; the result saturates at `Quantity::MAX`.
pub fn lane_sum(values: &[Quantity]) -> Quantity {
    let chunks = values.chunks_exact(LANES);
    let tail = chunks.remainder();

    let mut lanes = [0u64; LANES];
    for chunk in chunks {
        for (lane, value) in lanes.iter_mut().zip(chunk) {
            *lane += u64::from(*value);
        }
    }

    // Horizontal add of the lanes, then whatever did not fill a group.
    let mut total: u64 = lanes.iter().sum();
    for value in tail {
        total += u64::from(*value);
    }
    Quantity::try_from(total).unwrap_or(Quantity::MAX)
}

/// Orders at one price as parallel id / quantity vectors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VectorOrders {
    quantities: Vec<Quantity>,
    order_ids: Vec<OrderId>,
}

impl VectorOrders {
    fn position(&self, order_id: OrderId) -> Option<usize> {
        self.order_ids.iter().position(|id| *id == order_id)
    }

    /// The contiguous quantity buffer, in insertion order.
    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn order_ids(&self) -> &[OrderId] {
        &self.order_ids
    }
}

impl LevelOrders for VectorOrders {
    fn contains(&self, order_id: OrderId) -> bool {
        self.position(order_id).is_some()
    }

    fn quantity(&self, order_id: OrderId) -> Option<Quantity> {
        self.position(order_id).map(|i| self.quantities[i])
    }

    fn quantity_mut(&mut self, order_id: OrderId) -> &mut Quantity {
        let index = match self.position(order_id) {
            Some(i) => i,
            None => {
                self.order_ids.push(order_id);
                self.quantities.push(0);
                self.order_ids.len() - 1
            }
        };
        debug_assert_eq!(self.order_ids.len(), self.quantities.len());
        &mut self.quantities[index]
    }

    fn remove(&mut self, order_id: OrderId) -> Option<Quantity> {
        let index = self.position(order_id)?;
        self.order_ids.remove(index);
        let quantity = self.quantities.remove(index);
        debug_assert_eq!(self.order_ids.len(), self.quantities.len());
        Some(quantity)
    }

    fn len(&self) -> usize {
        self.order_ids.len()
    }

    fn sum(&self) -> Quantity {
        lane_sum(&self.quantities)
    }
}

/// One side of the book as parallel price / level vectors, unordered.
#[derive(Debug, Default, Clone)]
pub struct VectorLevels {
    prices: Vec<Price>,
    levels: Vec<VectorOrders>,
}

impl VectorLevels {
    fn position(&self, price: Price) -> Option<usize> {
        self.prices.iter().position(|p| *p == price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn contains(&self, price: Price) -> bool {
        self.position(price).is_some()
    }

    pub fn get(&self, price: Price) -> Option<&VectorOrders> {
        self.position(price).map(|i| &self.levels[i])
    }

    /// Index-and-create.
    pub fn get_or_insert(&mut self, price: Price) -> &mut VectorOrders {
        let index = match self.position(price) {
            Some(i) => i,
            None => {
                self.prices.push(price);
                self.levels.push(VectorOrders::default());
                self.prices.len() - 1
            }
        };
        debug_assert_eq!(self.prices.len(), self.levels.len());
        &mut self.levels[index]
    }

    pub fn remove(&mut self, price: Price) -> Option<VectorOrders> {
        let index = self.position(price)?;
        self.prices.remove(index);
        let orders = self.levels.remove(index);
        debug_assert_eq!(self.prices.len(), self.levels.len());
        Some(orders)
    }

    pub fn clear(&mut self) {
        self.prices.clear();
        self.levels.clear();
    }

    fn max_price(&self) -> Price {
        self.prices.iter().max().copied().unwrap_or(0)
    }

    fn min_price(&self) -> Price {
        self.prices.iter().min().copied().unwrap_or(0)
    }

    fn materialize(&self) -> Vec<(Price, &VectorOrders)> {
        self.prices.iter().copied().zip(self.levels.iter()).collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct VectorBook {
    bids: VectorLevels,
    asks: VectorLevels,
}

impl VectorBook {
    fn side(&self, side: Side) -> &VectorLevels {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut VectorLevels {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}

impl BookStorage for VectorBook {
    type Orders = VectorOrders;

    fn top_bid(&self) -> Price {
        self.bids.max_price()
    }

    fn top_ask(&self) -> Price {
        self.asks.min_price()
    }

    fn sorted_bids(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        let mut sorted = self.bids.materialize();
        sorted.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        sorted.into_iter()
    }

    fn sorted_asks(&self) -> impl Iterator<Item = (Price, &Self::Orders)> + '_ {
        let mut sorted = self.asks.materialize();
        sorted.sort_unstable_by_key(|(price, _)| *price);
        sorted.into_iter()
    }

    fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    fn has_level(&self, side: Side, price: Price) -> bool {
        self.side(side).contains(price)
    }

    fn level(&self, side: Side, price: Price) -> Option<&Self::Orders> {
        self.side(side).get(price)
    }

    fn level_mut(&mut self, side: Side, price: Price) -> &mut Self::Orders {
        self.side_mut(side).get_or_insert(price)
    }

    fn remove_level(&mut self, side: Side, price: Price) -> Option<Self::Orders> {
        self.side_mut(side).remove(price)
    }

    fn level_count(&self, side: Side) -> usize {
        self.side(side).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_sum_matches_fold_around_group_boundaries() {
        for len in [0, 1, LANES - 1, LANES, LANES + 1, 3 * LANES + 5] {
            let values: Vec<Quantity> = (1..=len as Quantity).collect();
            let expected: Quantity = values.iter().sum();
            assert_eq!(lane_sum(&values), expected, "len {len}");
        }
    }

    #[test]
    fn lane_sum_saturates() {
        let mut values = vec![Quantity::MAX - 100; LANES];
        values.push(500);
        assert_eq!(lane_sum(&values), Quantity::MAX);
        assert_eq!(lane_sum(&[Quantity::MAX - 1, 1]), Quantity::MAX);
    }

    #[test]
    fn index_stays_coherent_after_removal() {
        let mut level = VectorOrders::default();
        *level.quantity_mut(11) = 100;
        *level.quantity_mut(22) = 200;
        assert_eq!(level.remove(11), Some(100));

        assert_eq!(level.quantity(22), Some(200));
        assert_eq!(level.order_ids(), &[22]);
        assert_eq!(level.quantities(), &[200]);
    }

    #[test]
    fn level_index_stays_coherent_after_removal() {
        let mut levels = VectorLevels::default();
        *levels.get_or_insert(100).quantity_mut(1) = 5;
        *levels.get_or_insert(101).quantity_mut(2) = 6;
        assert!(levels.remove(100).is_some());

        assert_eq!(levels.get(101).and_then(|l| l.quantity(2)), Some(6));
        assert!(!levels.contains(100));
        assert_eq!(levels.len(), 1);
    }

    #[test]
    fn top_uses_max_and_min_search() {
        let mut book = VectorBook::default();
        for price in [50, 70, 60] {
            *book.level_mut(Side::Bid, price).quantity_mut(1) = 1;
            *book.level_mut(Side::Ask, price + 30).quantity_mut(1) = 1;
        }
        assert_eq!(book.top_bid(), 70);
        assert_eq!(book.top_ask(), 80);

        let asks: Vec<Price> = book.sorted_asks().map(|(p, _)| p).collect();
        assert_eq!(asks, vec![80, 90, 100]);
    }
}
