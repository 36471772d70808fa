//! Counter Message Model
//!
//! 柜台之间 (收银 ↔ 厨房 ↔ 管理员) 的简短留言。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Counter;

/// Which terminal wrote the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSide {
    #[default]
    Billing,
    Kitchen,
    Admin,
}

/// Message posted to a counter's board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterMessage {
    pub id: String,
    pub server: Counter,
    #[serde(default)]
    pub side: MessageSide,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub ts: DateTime<Utc>,
}

impl CounterMessage {
    pub fn new(server: Counter, side: MessageSide, text: impl Into<String>, user: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            server,
            side,
            text: text.into(),
            user,
            ts: Utc::now(),
        }
    }
}
