//! Catalog Service - 菜单加载与查询
//!
//! 菜单来自 `items.json`，只读。文件缺失或损坏时使用内置默认菜单。
//! 每个条目在加载时规范化 (id 小写、空白转 `-`、数值缺省为 0)。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use shared::models::{CatalogItem, ComboComponent};

/// Normalize an item id: trimmed, lower-case, whitespace runs → `-`
pub fn normalize_id(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Lenient string: strings as-is, numbers stringified, anything else empty
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Lenient number: numbers and numeric strings, anything else 0
fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Normalize one raw catalog entry; `None` when it has no usable id
pub fn normalize_item(raw: &Value) -> Option<CatalogItem> {
    let mut id = text(raw.get("id"));
    if id.trim().is_empty() {
        id = text(raw.get("name"));
    }
    let id = normalize_id(&id);
    if id.is_empty() {
        return None;
    }

    let combo = truthy(raw.get("combo"));
    let components = match raw.get("components") {
        Some(Value::Array(list)) if combo => list
            .iter()
            .filter_map(|c| {
                let id = normalize_id(&text(c.get("id")));
                // qty 缺失/为 0 时按 1 计
                let qty = match number(c.get("qty")) as i64 {
                    0 => 1,
                    q => q,
                };
                (!id.is_empty() && qty > 0).then_some(ComboComponent { id, qty })
            })
            .collect(),
        _ => Vec::new(),
    };

    let image = match raw.get("image") {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => None,
    };

    Some(CatalogItem {
        id,
        name: text(raw.get("name")).trim().to_string(),
        price: number(raw.get("price")),
        cost: number(raw.get("cost")),
        image,
        combo,
        components,
    })
}

/// Built-in menu used when no catalog file can be read
pub fn default_menu() -> Vec<CatalogItem> {
    vec![
        CatalogItem::simple("burger", "Veg Burger", 50.0),
        CatalogItem::simple("pizza", "Cheese Pizza Slice", 70.0),
        CatalogItem::simple("pasta", "White Sauce Pasta", 80.0),
        CatalogItem::simple("fries", "French Fries", 40.0),
        CatalogItem::simple("coke", "Coke (200ml)", 20.0),
    ]
}

/// Read and normalize a catalog file; falls back to the default menu
pub async fn load_items(path: &Path) -> Vec<CatalogItem> {
    let raw = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::info!(path = %path.display(), error = %e, "Catalog file not readable, using default menu");
            return default_menu();
        }
    };
    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries.iter().filter_map(normalize_item).collect(),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Catalog file is not an array, using default menu");
            default_menu()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Catalog file is corrupt, using default menu");
            default_menu()
        }
    }
}

/// In-memory catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            // 重复 id 以第一个为准
            by_id.entry(item.id.clone()).or_insert(i);
        }
        Self { items, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Catalog service with in-memory cache
#[derive(Clone)]
pub struct CatalogService {
    path: PathBuf,
    catalog: Arc<RwLock<Arc<Catalog>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("path", &self.path)
            .field("items", &self.catalog.read().len())
            .finish()
    }
}

impl CatalogService {
    /// Load the catalog file
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let catalog = Catalog::new(load_items(&path).await);
        tracing::info!(path = %path.display(), items = catalog.len(), "Catalog loaded");
        Self {
            path,
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Fixed catalog, not backed by a file
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Self {
            path: PathBuf::new(),
            catalog: Arc::new(RwLock::new(Arc::new(Catalog::new(items)))),
        }
    }

    /// Re-read the catalog file
    pub async fn reload(&self) -> Arc<Catalog> {
        if self.path.as_os_str().is_empty() {
            return self.snapshot();
        }
        let catalog = Arc::new(Catalog::new(load_items(&self.path).await));
        *self.catalog.write() = catalog.clone();
        catalog
    }

    /// Current catalog
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }
}
