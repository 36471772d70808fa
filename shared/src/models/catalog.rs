//! Catalog Model
//!
//! 菜单条目。套餐 (combo) 在下单时展开为基础条目。

use serde::{Deserialize, Serialize};

/// One base item inside a combo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboComponent {
    pub id: String,
    pub qty: i64,
}

/// Menu entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Selling price in currency unit
    pub price: f64,
    /// Cost price in currency unit (profit reporting)
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub combo: bool,
    #[serde(default)]
    pub components: Vec<ComboComponent>,
}

impl CatalogItem {
    /// Plain (non-combo) menu entry
    pub fn simple(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            cost: 0.0,
            image: None,
            combo: false,
            components: Vec::new(),
        }
    }

    /// A combo only expands when it actually lists components
    pub fn is_expandable_combo(&self) -> bool {
        self.combo && !self.components.is_empty()
    }
}
