//! 实时事件类型定义
//!
//! 这些类型在 stall-server 和终端 (收银/厨房) 之间共享。
//! 每个事件要么投递到单个柜台房间，要么广播到全部柜台。
//!
//! # 线格式
//!
//! ```json
//! { "event": "stage-change", "payload": { "token": "B7", "processing": true, "ready": false } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

use crate::models::{Counter, CounterMessage, Order};

/// 实时事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// 新订单
    NewOrder,
    /// 厨房阶段变更
    StageChange,
    /// 订单完成
    Completed,
    /// 可售状态变更
    AvailabilityChanged,
    /// 全量重置
    OrdersCleared,
    /// 柜台留言
    Message,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::NewOrder => write!(f, "new-order"),
            EventType::StageChange => write!(f, "stage-change"),
            EventType::Completed => write!(f, "completed"),
            EventType::AvailabilityChanged => write!(f, "availability-changed"),
            EventType::OrdersCleared => write!(f, "orders-cleared"),
            EventType::Message => write!(f, "message"),
        }
    }
}

/// 事件接收范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// 单个柜台房间
    Counter(Counter),
    /// 所有柜台
    All,
}

impl Audience {
    /// 房间是否在接收范围内
    pub fn includes(&self, counter: Counter) -> bool {
        match self {
            Audience::Counter(c) => *c == counter,
            Audience::All => true,
        }
    }
}

/// 实时事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    NewOrder(Box<Order>),
    StageChange(StagePayload),
    Completed(CompletedPayload),
    AvailabilityChanged(AvailabilityPayload),
    OrdersCleared,
    Message(Box<CounterMessage>),
}

impl RealtimeEvent {
    pub fn new_order(order: &Order) -> Self {
        RealtimeEvent::NewOrder(Box::new(order.clone()))
    }

    pub fn stage_change(order: &Order) -> Self {
        RealtimeEvent::StageChange(StagePayload {
            token: order.token.clone(),
            processing: order.processing,
            ready: order.ready,
        })
    }

    pub fn completed(order: &Order) -> Self {
        RealtimeEvent::Completed(CompletedPayload {
            token: order.token.clone(),
        })
    }

    pub fn availability(counter: Counter, unavailable_ids: Vec<String>) -> Self {
        RealtimeEvent::AvailabilityChanged(AvailabilityPayload {
            counter,
            unavailable_ids,
        })
    }

    pub fn message(msg: &CounterMessage) -> Self {
        RealtimeEvent::Message(Box::new(msg.clone()))
    }

    pub fn event_type(&self) -> EventType {
        match self {
            RealtimeEvent::NewOrder(_) => EventType::NewOrder,
            RealtimeEvent::StageChange(_) => EventType::StageChange,
            RealtimeEvent::Completed(_) => EventType::Completed,
            RealtimeEvent::AvailabilityChanged(_) => EventType::AvailabilityChanged,
            RealtimeEvent::OrdersCleared => EventType::OrdersCleared,
            RealtimeEvent::Message(_) => EventType::Message,
        }
    }

    /// 序列化为 JSON 文本帧
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
