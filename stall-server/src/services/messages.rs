//! Counter message board
//!
//! 收银、厨房与管理员之间的简短留言，按柜台分房间推送。

use std::sync::Arc;

use shared::message::{Audience, RealtimeEvent};
use shared::models::{Counter, CounterMessage, MessageSide};

use crate::realtime::EventPublisher;
use crate::storage::{DataStore, Document};
use crate::utils::validation::{MAX_MESSAGE_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Window in which identical admin lines count as one broadcast
const BROADCAST_MERGE_WINDOW_SECS: i64 = 10;

/// Collapse the per-counter copies of an admin broadcast into one line
///
/// Expects `list` ascending by timestamp.
pub fn merge_broadcasts(list: Vec<CounterMessage>) -> Vec<CounterMessage> {
    let mut merged: Vec<CounterMessage> = Vec::with_capacity(list.len());
    for msg in list {
        if msg.side == MessageSide::Admin
            && let Some(last) = merged.last()
            && last.side == MessageSide::Admin
            && last.text == msg.text
            && (msg.ts - last.ts).num_seconds().abs() < BROADCAST_MERGE_WINDOW_SECS
        {
            continue;
        }
        merged.push(msg);
    }
    merged
}

#[derive(Clone)]
pub struct MessageService {
    store: DataStore,
    publisher: Arc<dyn EventPublisher>,
}

fn clean_user(user: Option<String>) -> Option<String> {
    user.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

impl MessageService {
    pub fn new(store: DataStore, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Post a message to one counter
    pub async fn add(
        &self,
        counter: Counter,
        side: MessageSide,
        text: &str,
        user: Option<String>,
    ) -> AppResult<CounterMessage> {
        let text = text.trim();
        validate_required_text(text, "text", MAX_MESSAGE_LEN)?;
        let user = clean_user(user);
        validate_optional_text(&user, "user", MAX_NAME_LEN)?;

        let (msg, ticket) = self.store.mutate(|data, changes| {
            let msg = CounterMessage::new(counter, side, text, user);
            data.messages.push(msg.clone());
            changes.mark(Document::Messages);
            self.publisher
                .publish(Audience::Counter(counter), RealtimeEvent::message(&msg));
            Ok::<_, AppError>(msg)
        })?;

        tracing::info!(counter = %counter, side = ?side, "Counter message posted");
        if let Err(e) = ticket.wait().await {
            tracing::error!(error = %e, "Counter message not persisted");
        }
        Ok(msg)
    }

    /// Admin message posted to both counters (one record per counter)
    pub async fn broadcast(&self, text: &str, user: Option<String>) -> AppResult<Vec<CounterMessage>> {
        let text = text.trim();
        validate_required_text(text, "text", MAX_MESSAGE_LEN)?;
        let user = clean_user(user).or_else(|| Some("ADMIN".to_string()));
        validate_optional_text(&user, "user", MAX_NAME_LEN)?;

        let (posted, ticket) = self.store.mutate(|data, changes| {
            let mut posted = Vec::with_capacity(Counter::ALL.len());
            for counter in Counter::ALL {
                let msg = CounterMessage::new(counter, MessageSide::Admin, text, user.clone());
                data.messages.push(msg.clone());
                self.publisher
                    .publish(Audience::Counter(counter), RealtimeEvent::message(&msg));
                posted.push(msg);
            }
            changes.mark(Document::Messages);
            Ok::<_, AppError>(posted)
        })?;

        tracing::info!("Admin message broadcast to all counters");
        if let Err(e) = ticket.wait().await {
            tracing::error!(error = %e, "Admin message not persisted");
        }
        Ok(posted)
    }

    /// Messages ascending by timestamp, optionally for one counter
    pub fn list(&self, counter: Option<Counter>) -> Vec<CounterMessage> {
        let mut list: Vec<CounterMessage> = self.store.read(|data| {
            data.messages
                .iter()
                .filter(|m| counter.is_none_or(|c| m.server == c))
                .cloned()
                .collect()
        });
        list.sort_by_key(|m| m.ts);
        list
    }
}
