//! RealtimeHub - 柜台房间实时分发
//!
//! 每个柜台一个房间，终端 (收银/厨房) 只接收自己柜台的事件。
//!
//! ```text
//! OrdersManager / services
//!       │ publish(Audience, RealtimeEvent)
//!       ▼
//! RealtimeHub
//!   ├── room 1: broadcast::Sender ──► WS sessions (counter=1)
//!   └── room 2: broadcast::Sender ──► WS sessions (counter=2)
//! ```
//!
//! 投递是 best-effort: 至多一次，无重放，慢订阅者会丢失事件 (Lagged)。

pub mod ws;

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{Audience, RealtimeEvent};
use shared::models::Counter;
use tokio::sync::broadcast;

/// Broadcast channel 容量，足以缓冲高峰期的突发
const ROOM_CAPACITY: usize = 256;

/// Event sink used by the order manager and services
///
/// Publishing must never block the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, audience: Audience, event: RealtimeEvent);
}

/// Counter-scoped fan-out
#[derive(Clone, Default)]
pub struct RealtimeHub {
    /// counter → room sender
    rooms: Arc<DashMap<Counter, broadcast::Sender<Arc<RealtimeEvent>>>>,
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn room(&self, counter: Counter) -> broadcast::Sender<Arc<RealtimeEvent>> {
        self.rooms
            .entry(counter)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .clone()
    }

    /// Join a counter room
    pub fn subscribe(&self, counter: Counter) -> broadcast::Receiver<Arc<RealtimeEvent>> {
        self.room(counter).subscribe()
    }

    /// Subscribers of one room
    pub fn room_size(&self, counter: Counter) -> usize {
        self.rooms
            .get(&counter)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Subscribers across all rooms
    pub fn subscriber_count(&self) -> usize {
        self.rooms.iter().map(|tx| tx.receiver_count()).sum()
    }
}

impl EventPublisher for RealtimeHub {
    fn publish(&self, audience: Audience, event: RealtimeEvent) {
        let event = Arc::new(event);
        let event_type = event.event_type();
        for counter in Counter::ALL {
            if !audience.includes(counter) {
                continue;
            }
            // 无订阅者时 send 返回 Err，安全忽略
            let delivered = self
                .rooms
                .get(&counter)
                .and_then(|tx| tx.send(event.clone()).ok())
                .unwrap_or(0);
            tracing::debug!(event = %event_type, counter = %counter, delivered, "Realtime event published");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Order, OrderItem};

    fn order(token: &str, counter: Counter) -> Order {
        Order::new(
            token,
            counter,
            vec![OrderItem {
                id: "pizza".into(),
                name: "Cheese Pizza Slice".into(),
                price: 70.0,
                qty: 1,
            }],
        )
    }

    #[tokio::test]
    async fn test_counter_rooms_are_isolated() {
        let hub = RealtimeHub::new();
        let mut one = hub.subscribe(Counter::One);
        let mut two = hub.subscribe(Counter::Two);

        let o = order("G1", Counter::Two);
        hub.publish(Audience::Counter(Counter::Two), RealtimeEvent::new_order(&o));

        let got = two.recv().await.unwrap();
        assert_eq!(*got, RealtimeEvent::new_order(&o));
        assert!(matches!(
            one.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_broadcast_to_all_rooms() {
        let hub = RealtimeHub::new();
        let mut one = hub.subscribe(Counter::One);
        let mut two = hub.subscribe(Counter::Two);
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(Audience::All, RealtimeEvent::OrdersCleared);
        assert_eq!(*one.recv().await.unwrap(), RealtimeEvent::OrdersCleared);
        assert_eq!(*two.recv().await.unwrap(), RealtimeEvent::OrdersCleared);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let hub = RealtimeHub::new();
        hub.publish(Audience::All, RealtimeEvent::OrdersCleared);
        assert_eq!(hub.room_size(Counter::One), 0);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscriber() {
        let hub = RealtimeHub::new();
        let _early = hub.subscribe(Counter::One);
        hub.publish(Audience::Counter(Counter::One), RealtimeEvent::OrdersCleared);

        let mut late = hub.subscribe(Counter::One);
        assert!(late.try_recv().is_err());
    }
}
