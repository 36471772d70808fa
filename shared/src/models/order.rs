//! Order Model
//!
//! 订单生命周期:
//!
//! ```text
//! pending(processing=false, ready=false)
//!     → pending(processing=true,  ready=false)
//!     → pending(processing=false, ready=true)
//!     → completed (completedAt 已设置)
//! ```

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::Counter;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
}

impl OrderStatus {
    /// Parse a status filter; `"all"` (or empty) means no filter
    pub fn parse_filter(value: &str) -> Result<Option<OrderStatus>, String> {
        match value.trim() {
            "" | "all" => Ok(None),
            "pending" => Ok(Some(OrderStatus::Pending)),
            "completed" => Ok(Some(OrderStatus::Completed)),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

/// Expanded order line (combos are already resolved to base items)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    /// Unit price in currency unit
    pub price: f64,
    pub qty: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.qty as f64
    }
}

/// Raw cart line as sent by the billing terminal
///
/// Every field is lenient: missing or mistyped values (`"qty": "2"`,
/// `"price": null`) coerce or default, and bad lines are filtered out
/// during normalization instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItemInput {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_qty")]
    pub qty: i64,
}

/// 字符串原样, 数字转字符串, 其他为空
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Numbers and numeric strings; anything else (or non-finite) is 0
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let n = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if n.is_finite() { n } else { 0.0 })
}

/// Integer quantity; fractional values truncate, garbage becomes 0
fn lenient_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let from_float = |f: f64| if f.is_finite() { f.trunc() as i64 } else { 0 };
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => n.as_f64().map_or(0, from_float),
        },
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => s.parse::<f64>().map_or(0, from_float),
            }
        }
        _ => 0,
    })
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub token: String,
    pub server: Counter,
    pub items: Vec<OrderItem>,
    /// Total amount, fixed at creation
    pub total: f64,
    #[serde(default)]
    pub processing: bool,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a fresh pending order; total is computed from `items` once here
    pub fn new(token: impl Into<String>, server: Counter, items: Vec<OrderItem>) -> Self {
        let total = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token: token.into(),
            server,
            items,
            total,
            processing: false,
            ready: false,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Sort key for history views: completion time, falling back to creation
    pub fn activity_time(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }

    /// Apply a kitchen stage transition
    pub fn apply_stage(&mut self, mode: StageMode) {
        match mode {
            StageMode::Processing => {
                self.processing = true;
                self.ready = false;
            }
            StageMode::Ready => {
                self.processing = false;
                self.ready = true;
            }
            StageMode::Idle => {
                self.processing = false;
                self.ready = false;
            }
        }
    }

    /// Mark the order completed; returns false when it already was
    pub fn complete(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = OrderStatus::Completed;
        self.completed_at = Some(Utc::now());
        true
    }
}

/// Kitchen stage requested by a terminal
///
/// On the wire this is tri-state: `true`, `false` or `"ready"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageMode {
    /// `true` - kitchen started preparing
    #[default]
    Processing,
    /// `"ready"` - waiting for pickup
    Ready,
    /// `false` - back to the queue
    Idle,
}

impl Serialize for StageMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StageMode::Processing => serializer.serialize_bool(true),
            StageMode::Idle => serializer.serialize_bool(false),
            StageMode::Ready => serializer.serialize_str("ready"),
        }
    }
}

impl<'de> Deserialize<'de> for StageMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(StageMode::Processing),
            Raw::Flag(false) => Ok(StageMode::Idle),
            Raw::Word(w) if w == "ready" => Ok(StageMode::Ready),
            Raw::Word(w) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&w),
                &"true, false or \"ready\"",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, qty: i64) -> OrderItem {
        OrderItem {
            id: id.to_string(),
            name: id.to_string(),
            price,
            qty,
        }
    }

    #[test]
    fn test_cart_item_input_is_lenient() {
        let items: Vec<CartItemInput> = serde_json::from_str(
            r#"[
                {"id": "fries", "name": "French Fries", "price": "40", "qty": "2"},
                {"id": 7, "price": 12.5, "qty": 1.9},
                {"name": "Chai", "price": null, "qty": "lots"},
                {"id": ["x"], "name": {}, "price": true, "qty": false}
            ]"#,
        )
        .unwrap();

        assert_eq!(items[0].price, 40.0);
        assert_eq!(items[0].qty, 2);
        assert_eq!(items[1].id, "7");
        assert_eq!(items[1].name, "");
        assert_eq!(items[1].qty, 1);
        assert_eq!(items[2].price, 0.0);
        assert_eq!(items[2].qty, 0);
        assert_eq!(items[3], CartItemInput::default());
    }

    #[test]
    fn test_new_order_total() {
        let order = Order::new("B1", Counter::One, vec![item("fries", 40.0, 2), item("coke", 20.0, 1)]);
        assert_eq!(order.total, 100.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.processing && !order.ready);
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn test_stage_transitions_keep_invariant() {
        let mut order = Order::new("G4", Counter::Two, vec![item("pasta", 80.0, 1)]);
        order.apply_stage(StageMode::Processing);
        assert!(order.processing && !order.ready);
        order.apply_stage(StageMode::Ready);
        assert!(!order.processing && order.ready);
        order.apply_stage(StageMode::Idle);
        assert!(!order.processing && !order.ready);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut order = Order::new("B2", Counter::One, vec![item("burger", 50.0, 1)]);
        assert!(order.complete());
        let first = order.completed_at;
        assert!(first.is_some());
        assert!(!order.complete());
        assert_eq!(order.completed_at, first);
    }

    #[test]
    fn test_stage_mode_wire_format() {
        let m: StageMode = serde_json::from_str("true").unwrap();
        assert_eq!(m, StageMode::Processing);
        let m: StageMode = serde_json::from_str("false").unwrap();
        assert_eq!(m, StageMode::Idle);
        let m: StageMode = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(m, StageMode::Ready);
        assert!(serde_json::from_str::<StageMode>("\"done\"").is_err());
        assert_eq!(serde_json::to_string(&StageMode::Ready).unwrap(), "\"ready\"");
    }

    #[test]
    fn test_order_json_shape() {
        let order = Order::new("B9", Counter::One, vec![item("coke", 20.0, 3)]);
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["token"], "B9");
        assert_eq!(value["server"], 1);
        assert_eq!(value["status"], "pending");
        assert!(value["createdAt"].is_string());
        assert!(value["completedAt"].is_null());
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(OrderStatus::parse_filter("all"), Ok(None));
        assert_eq!(
            OrderStatus::parse_filter("completed"),
            Ok(Some(OrderStatus::Completed))
        );
        assert!(OrderStatus::parse_filter("void").is_err());
    }
}
