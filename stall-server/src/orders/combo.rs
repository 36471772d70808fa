//! Cart normalization and combo expansion
//!
//! ```text
//! cart lines ──normalize──► clean lines ──expand──► order items
//!                                          │
//!                           combo{a:3} ×2 ─┴─► a ×6 (merged by base id)
//! ```
//!
//! The kitchen only ever sees base items: combos are replaced by their
//! components, and lines resolving to the same base item are merged.

use std::collections::HashMap;

use shared::models::{CartItemInput, OrderItem};

use super::manager::ManagerError;
use crate::services::Catalog;
use crate::services::catalog::normalize_id;

/// A cart line after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: i64,
}

/// Clean raw cart input
///
/// Lines with no id and no name, non-positive qty, or a negative/non-finite
/// price are dropped.
pub fn normalize_items(raw: &[CartItemInput]) -> Vec<CartLine> {
    raw.iter()
        .filter_map(|it| {
            let name = it.name.trim().to_string();
            let id = match it.id.trim() {
                "" => name.clone(),
                id => id.to_string(),
            };
            let valid = !id.is_empty() && it.qty > 0 && it.price.is_finite() && it.price >= 0.0;
            valid.then_some(CartLine {
                id,
                name,
                price: it.price,
                qty: it.qty,
            })
        })
        .collect()
}

/// Accumulates expanded lines keyed by base id, keeping first-seen order
#[derive(Default)]
struct Expansion {
    items: Vec<OrderItem>,
    index: HashMap<String, usize>,
}

impl Expansion {
    fn add(&mut self, id: &str, name: &str, price: f64, qty: i64) -> Result<(), ManagerError> {
        match self.index.get(id) {
            Some(&i) => {
                let merged = &mut self.items[i].qty;
                *merged = merged.checked_add(qty).ok_or_else(quantity_too_large)?;
            }
            None => {
                self.index.insert(id.to_string(), self.items.len());
                self.items.push(OrderItem {
                    id: id.to_string(),
                    name: name.to_string(),
                    price,
                    qty,
                });
            }
        }
        Ok(())
    }
}

fn quantity_too_large() -> ManagerError {
    ManagerError::InvalidOrder("Item quantity too large".into())
}

/// Expand combos into base items and merge lines by base id
///
/// Known items take their name and price from the catalog; unknown items
/// pass through with the cart's values. Combo components missing from the
/// catalog are silently dropped. Quantities that overflow while
/// multiplying or merging reject the whole cart.
pub fn expand_items(lines: &[CartLine], catalog: &Catalog) -> Result<Vec<OrderItem>, ManagerError> {
    let mut out = Expansion::default();

    for line in lines {
        let def = catalog
            .get(&line.id)
            .or_else(|| catalog.get(&normalize_id(&line.id)));

        match def {
            Some(combo) if combo.is_expandable_combo() => {
                for component in &combo.components {
                    let Some(base) = catalog.get(&component.id) else {
                        tracing::debug!(combo = %combo.id, component = %component.id, "Dropping combo component missing from catalog");
                        continue;
                    };
                    let qty = component
                        .qty
                        .checked_mul(line.qty)
                        .ok_or_else(quantity_too_large)?;
                    if qty > 0 {
                        out.add(&base.id, &base.name, base.price, qty)?;
                    }
                }
            }
            Some(base) => {
                let name = if base.name.is_empty() { &line.name } else { &base.name };
                out.add(&base.id, name, base.price, line.qty)?;
            }
            None => {
                let name = if line.name.is_empty() { &line.id } else { &line.name };
                out.add(&line.id, name, line.price, line.qty)?;
            }
        }
    }

    out.items.retain(|item| item.qty > 0);
    Ok(out.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CatalogItem, ComboComponent};

    fn catalog() -> Catalog {
        let mut meal = CatalogItem::simple("meal", "Burger Meal", 100.0);
        meal.combo = true;
        meal.components = vec![
            ComboComponent { id: "burger".into(), qty: 1 },
            ComboComponent { id: "fries".into(), qty: 1 },
            ComboComponent { id: "ghost".into(), qty: 2 },
        ];
        let mut triple = CatalogItem::simple("triple", "Triple Fries", 100.0);
        triple.combo = true;
        triple.components = vec![ComboComponent { id: "fries".into(), qty: 3 }];
        // combo flag without components behaves like a plain item
        let mut hollow = CatalogItem::simple("hollow", "Hollow Combo", 30.0);
        hollow.combo = true;

        Catalog::new(vec![
            CatalogItem::simple("burger", "Veg Burger", 50.0),
            CatalogItem::simple("fries", "French Fries", 40.0),
            meal,
            triple,
            hollow,
        ])
    }

    fn cart(id: &str, name: &str, price: f64, qty: i64) -> CartItemInput {
        CartItemInput {
            id: id.into(),
            name: name.into(),
            price,
            qty,
        }
    }

    #[test]
    fn test_normalize_drops_bad_lines() {
        let lines = normalize_items(&[
            cart(" fries ", "French Fries", 40.0, 2),
            cart("", "Chai", 10.0, 1),
            cart("", "", 10.0, 1),
            cart("coke", "Coke", 20.0, 0),
            cart("coke", "Coke", -1.0, 1),
            cart("coke", "Coke", f64::NAN, 1),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, "fries");
        assert_eq!(lines[1].id, "Chai");
        assert!(normalize_items(&[]).is_empty());
    }

    #[test]
    fn test_combo_and_base_merge() {
        // 2× combo{fries:3} + 1× fries → fries ×7
        let lines = normalize_items(&[
            cart("triple", "Triple Fries", 100.0, 2),
            cart("fries", "French Fries", 40.0, 1),
        ]);
        let items = expand_items(&lines, &catalog()).unwrap();
        assert_eq!(
            items,
            vec![OrderItem {
                id: "fries".into(),
                name: "French Fries".into(),
                price: 40.0,
                qty: 7,
            }]
        );
    }

    #[test]
    fn test_missing_component_dropped() {
        let lines = normalize_items(&[cart("meal", "Burger Meal", 100.0, 1)]);
        let items = expand_items(&lines, &catalog()).unwrap();
        let ids: Vec<_> = items.iter().map(|i| (i.id.as_str(), i.qty)).collect();
        assert_eq!(ids, vec![("burger", 1), ("fries", 1)]);
    }

    #[test]
    fn test_catalog_price_wins_for_known_items() {
        let lines = normalize_items(&[cart("burger", "Cheap Burger", 1.0, 2)]);
        let items = expand_items(&lines, &catalog()).unwrap();
        assert_eq!(items[0].price, 50.0);
        assert_eq!(items[0].name, "Veg Burger");
    }

    #[test]
    fn test_unknown_and_hollow_items_pass_through() {
        let lines = normalize_items(&[
            cart("Chai Special", "Chai Special", 15.0, 2),
            cart("hollow", "Hollow Combo", 30.0, 1),
        ]);
        let items = expand_items(&lines, &catalog()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "Chai Special");
        assert_eq!(items[0].price, 15.0);
        assert_eq!(items[1].id, "hollow");
        assert_eq!(items[1].price, 30.0);
    }

    #[test]
    fn test_combo_with_only_missing_components_expands_to_nothing() {
        let mut ghost_meal = CatalogItem::simple("ghost-meal", "Ghost Meal", 10.0);
        ghost_meal.combo = true;
        ghost_meal.components = vec![ComboComponent { id: "ghost".into(), qty: 1 }];
        let catalog = Catalog::new(vec![ghost_meal]);

        let lines = normalize_items(&[cart("ghost-meal", "Ghost Meal", 10.0, 1)]);
        assert!(expand_items(&lines, &catalog).unwrap().is_empty());
    }

    #[test]
    fn test_quantity_overflow_rejected() {
        // combo multiplier overflows
        let lines = normalize_items(&[cart("triple", "Triple Fries", 100.0, i64::MAX / 2)]);
        let err = expand_items(&lines, &catalog()).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidOrder(_)));

        // merging two large lines overflows
        let lines = normalize_items(&[
            cart("fries", "French Fries", 40.0, i64::MAX),
            cart("fries", "French Fries", 40.0, 1),
        ]);
        assert!(matches!(
            expand_items(&lines, &catalog()),
            Err(ManagerError::InvalidOrder(_))
        ));

        // large but representable quantities still go through
        let lines = normalize_items(&[cart("fries", "French Fries", 40.0, i64::MAX)]);
        assert_eq!(expand_items(&lines, &catalog()).unwrap()[0].qty, i64::MAX);
    }
}
