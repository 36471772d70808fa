//! Availability board - 柜台可售状态
//!
//! 每个柜台维护一组已售罄 (unavailable) 的条目 id。
//! 持久化格式沿用 `{ "<counter>": { "<itemId>": false } }`。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;
use shared::message::{Audience, RealtimeEvent};
use shared::models::Counter;

use crate::realtime::EventPublisher;
use crate::storage::{DataStore, Document};
use crate::utils::AppResult;
use crate::utils::validation::{MAX_ITEM_ID_LEN, validate_required_text};

/// Per-counter unavailable item ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityBoard {
    unavailable: BTreeMap<Counter, BTreeSet<String>>,
}

impl AvailabilityBoard {
    /// Build from the persisted document; only `false` entries mean unavailable
    pub fn from_document(doc: BTreeMap<String, BTreeMap<String, Value>>) -> Self {
        let mut unavailable = BTreeMap::new();
        for (key, items) in doc {
            let Some(counter) = key.parse::<u8>().ok().and_then(|n| Counter::try_from(n).ok()) else {
                tracing::warn!(key = %key, "Ignoring availability entry for unknown counter");
                continue;
            };
            let ids: BTreeSet<String> = items
                .into_iter()
                .filter(|(_, v)| *v == Value::Bool(false))
                .map(|(id, _)| id)
                .collect();
            unavailable.insert(counter, ids);
        }
        Self { unavailable }
    }

    pub fn to_document(&self) -> BTreeMap<String, BTreeMap<String, bool>> {
        self.unavailable
            .iter()
            .map(|(counter, ids)| {
                (
                    counter.key(),
                    ids.iter().map(|id| (id.clone(), false)).collect(),
                )
            })
            .collect()
    }

    pub fn unavailable_ids(&self, counter: Counter) -> Vec<String> {
        self.unavailable
            .get(&counter)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_available(&self, counter: Counter, id: &str) -> bool {
        !self
            .unavailable
            .get(&counter)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Replace a counter's unavailable set
    pub fn set_unavailable(&mut self, counter: Counter, ids: impl IntoIterator<Item = String>) {
        self.unavailable.insert(counter, ids.into_iter().collect());
    }

    /// Mark one item available or not; returns whether anything changed
    pub fn toggle(&mut self, counter: Counter, id: &str, available: bool) -> bool {
        let ids = self.unavailable.entry(counter).or_default();
        if available {
            ids.remove(id)
        } else {
            ids.insert(id.to_string())
        }
    }

    pub fn clear(&mut self) {
        self.unavailable.clear();
    }
}

/// Availability operations with persistence and realtime notification
#[derive(Clone)]
pub struct AvailabilityService {
    store: DataStore,
    publisher: Arc<dyn EventPublisher>,
}

impl AvailabilityService {
    pub fn new(store: DataStore, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    pub fn unavailable_ids(&self, counter: Counter) -> Vec<String> {
        self.store.read(|data| data.availability.unavailable_ids(counter))
    }

    /// Replace a counter's unavailable set
    pub async fn set_unavailable(&self, counter: Counter, ids: Vec<String>) -> AppResult<Vec<String>> {
        let mut cleaned = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            validate_required_text(&id, "item id", MAX_ITEM_ID_LEN)?;
            cleaned.push(id);
        }

        let (current, ticket) = self.store.mutate(|data, changes| {
            data.availability.set_unavailable(counter, cleaned);
            changes.mark(Document::Availability);
            let current = data.availability.unavailable_ids(counter);
            self.publisher.publish(
                Audience::Counter(counter),
                RealtimeEvent::availability(counter, current.clone()),
            );
            Ok::<_, crate::utils::AppError>(current)
        })?;

        tracing::info!(counter = %counter, unavailable = current.len(), "Availability replaced");
        if let Err(e) = ticket.wait().await {
            tracing::error!(counter = %counter, error = %e, "Availability change not persisted");
        }
        Ok(current)
    }

    /// Mark a single item available/unavailable
    pub async fn toggle(&self, counter: Counter, id: &str, available: bool) -> AppResult<Vec<String>> {
        let id = id.trim();
        validate_required_text(id, "item id", MAX_ITEM_ID_LEN)?;

        let (current, ticket) = self.store.mutate(|data, changes| {
            if data.availability.toggle(counter, id, available) {
                changes.mark(Document::Availability);
            }
            let current = data.availability.unavailable_ids(counter);
            self.publisher.publish(
                Audience::Counter(counter),
                RealtimeEvent::availability(counter, current.clone()),
            );
            Ok::<_, crate::utils::AppError>(current)
        })?;

        tracing::info!(counter = %counter, item = %id, available, "Availability toggled");
        if let Err(e) = ticket.wait().await {
            tracing::error!(counter = %counter, error = %e, "Availability change not persisted");
        }
        Ok(current)
    }
}
