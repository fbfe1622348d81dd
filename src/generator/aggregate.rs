//! Order-total aggregation.
//!
//! Totals are a left join of per-order item sums onto the order list:
//! orders with no items get 0.00, and no order is added or dropped.

use crate::model::{round2, Order, OrderItem};
use ahash::AHashMap;

/// Sum `line_total` per owning order id
pub fn order_totals(items: &[OrderItem]) -> AHashMap<u32, f64> {
    let mut totals: AHashMap<u32, f64> = AHashMap::new();
    for item in items {
        *totals.entry(item.order_id).or_insert(0.0) += item.line_total;
    }
    totals
}

/// Fill in `total_amount` on every order from its items
pub fn apply_order_totals(mut orders: Vec<Order>, items: &[OrderItem]) -> Vec<Order> {
    let totals = order_totals(items);
    for order in &mut orders {
        let sum = totals.get(&order.order_id).copied().unwrap_or(0.0);
        order.total_amount = round2(sum);
    }
    orders
}
