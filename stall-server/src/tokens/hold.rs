//! Reservation holds
//!
//! 收银终端反复预览时应拿到同一个号，直到下单消费或冲突刷新。
//! Hold 以客户端 session id 为键，每个柜台最多一个。

use std::collections::HashMap;

use dashmap::DashMap;
use shared::models::Counter;

/// Per-session previewed tokens
#[derive(Debug, Default)]
pub struct HoldRegistry {
    holds: DashMap<String, HashMap<Counter, String>>,
}

impl HoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token currently held by a session for a counter
    pub fn get(&self, session: &str, counter: Counter) -> Option<String> {
        self.holds
            .get(session)
            .and_then(|entry| entry.get(&counter).cloned())
    }

    pub fn set(&self, session: &str, counter: Counter, token: impl Into<String>) {
        self.holds
            .entry(session.to_string())
            .or_default()
            .insert(counter, token.into());
    }

    /// Remove and return a session's hold for a counter
    pub fn take(&self, session: &str, counter: Counter) -> Option<String> {
        let token = self.holds.get_mut(session)?.remove(&counter);
        self.holds.remove_if(session, |_, held| held.is_empty());
        token
    }

    /// Whether any session holds this token
    pub fn is_held(&self, token: &str) -> bool {
        self.holds
            .iter()
            .any(|entry| entry.values().any(|held| held == token))
    }

    /// Drop every hold on one counter (after a counter reset)
    pub fn drop_counter(&self, counter: Counter) {
        self.holds.alter_all(|_, mut held| {
            held.remove(&counter);
            held
        });
        self.holds.retain(|_, held| !held.is_empty());
    }

    pub fn clear(&self) {
        self.holds.clear();
    }

    pub fn len(&self) -> usize {
        self.holds.iter().map(|entry| entry.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
