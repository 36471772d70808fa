//! Sales statistics over completed orders

use serde::Serialize;
use shared::models::{Counter, Order};

use crate::services::Catalog;

/// Revenue summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub counter: Option<Counter>,
    pub order_count: usize,
    /// Σ order totals
    pub revenue: f64,
    /// Σ catalog cost × qty (items missing from the catalog cost nothing)
    pub total_cost: f64,
    pub profit: f64,
}

/// Per-item statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub cost: f64,
    pub total_qty: i64,
    pub counter1_qty: i64,
    pub counter2_qty: i64,
    /// total qty × current catalog price
    pub revenue: f64,
    pub cost_total: f64,
    pub profit: f64,
}

fn completed<'a>(orders: &'a [Order], counter: Option<Counter>) -> impl Iterator<Item = &'a Order> {
    orders
        .iter()
        .filter(move |o| o.is_completed() && counter.is_none_or(|c| o.server == c))
}

pub fn sales_summary(orders: &[Order], catalog: &Catalog, counter: Option<Counter>) -> SalesSummary {
    let mut summary = SalesSummary {
        counter,
        ..SalesSummary::default()
    };
    for order in completed(orders, counter) {
        summary.order_count += 1;
        summary.revenue += order.total;
        summary.total_cost += order
            .items
            .iter()
            .filter_map(|item| catalog.get(&item.id).map(|def| def.cost * item.qty as f64))
            .sum::<f64>();
    }
    summary.profit = summary.revenue - summary.total_cost;
    summary
}

/// Statistics for one catalog item; `None` when the item is not in the catalog
pub fn item_stats(orders: &[Order], catalog: &Catalog, id: &str) -> Option<ItemStats> {
    let def = catalog.get(id)?;

    let mut per_counter = [0i64; 2];
    for order in completed(orders, None) {
        let qty: i64 = order
            .items
            .iter()
            .filter(|item| item.id == def.id)
            .map(|item| item.qty)
            .sum();
        match order.server {
            Counter::One => per_counter[0] += qty,
            Counter::Two => per_counter[1] += qty,
        }
    }

    let total_qty = per_counter[0] + per_counter[1];
    let revenue = total_qty as f64 * def.price;
    let cost_total = total_qty as f64 * def.cost;
    Some(ItemStats {
        id: def.id.clone(),
        name: def.name.clone(),
        price: def.price,
        cost: def.cost,
        total_qty,
        counter1_qty: per_counter[0],
        counter2_qty: per_counter[1],
        revenue,
        cost_total,
        profit: revenue - cost_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CatalogItem, OrderItem};

    fn catalog() -> Catalog {
        let mut burger = CatalogItem::simple("burger", "Veg Burger", 50.0);
        burger.cost = 20.0;
        let mut coke = CatalogItem::simple("coke", "Coke (200ml)", 20.0);
        coke.cost = 8.0;
        Catalog::new(vec![burger, coke])
    }

    fn order(counter: Counter, items: &[(&str, f64, i64)], done: bool) -> Order {
        let items = items
            .iter()
            .map(|(id, price, qty)| OrderItem {
                id: id.to_string(),
                name: id.to_string(),
                price: *price,
                qty: *qty,
            })
            .collect();
        let mut o = Order::new("B1", counter, items);
        if done {
            o.complete();
        }
        o
    }

    fn orders() -> Vec<Order> {
        vec![
            order(Counter::One, &[("burger", 50.0, 2), ("coke", 20.0, 1)], true),
            order(Counter::Two, &[("burger", 50.0, 1), ("chai", 10.0, 3)], true),
            order(Counter::Two, &[("burger", 50.0, 5)], false),
        ]
    }

    #[test]
    fn test_summary_all_counters() {
        let s = sales_summary(&orders(), &catalog(), None);
        assert_eq!(s.order_count, 2);
        assert_eq!(s.revenue, 120.0 + 80.0);
        assert_eq!(s.total_cost, 2.0 * 20.0 + 8.0 + 20.0);
        assert_eq!(s.profit, 200.0 - 68.0);
    }

    #[test]
    fn test_summary_one_counter() {
        let s = sales_summary(&orders(), &catalog(), Some(Counter::Two));
        assert_eq!(s.order_count, 1);
        assert_eq!(s.revenue, 80.0);
        assert_eq!(s.total_cost, 20.0);
    }

    #[test]
    fn test_item_stats() {
        let stats = item_stats(&orders(), &catalog(), "burger").unwrap();
        assert_eq!(stats.total_qty, 3);
        assert_eq!(stats.counter1_qty, 2);
        assert_eq!(stats.counter2_qty, 1);
        assert_eq!(stats.revenue, 150.0);
        assert_eq!(stats.cost_total, 60.0);
        assert_eq!(stats.profit, 90.0);

        assert!(item_stats(&orders(), &catalog(), "chai").is_none());
    }
}
