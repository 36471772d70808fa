//! OrdersManager - token allocation and order lifecycle
//!
//! This module handles:
//! - Token preview / reservation (sequential and legacy random)
//! - Checkout (token reconciliation, combo expansion, order creation)
//! - Kitchen stage transitions and completion
//! - Counter / full resets
//!
//! # Operation Flow
//!
//! ```text
//! checkout(req)
//!     ├─ 1. Normalize + expand cart (outside the lock, catalog snapshot)
//!     ├─ 2. Lock store
//!     ├─ 3. Resolve token (explicit → held → sequential)
//!     ├─ 4. Commit token, append order
//!     ├─ 5. Publish new-order to the counter room
//!     ├─ 6. Unlock, request flushes
//!     └─ 7. Await flush (failures are logged, in-memory state stays)
//! ```
//!
//! Every mutation either fully applies or returns an error before anything
//! is published or flushed.

mod error;
pub use error::*;

use std::sync::Arc;

use shared::message::{Audience, RealtimeEvent};
use shared::models::{CartItemInput, Counter, Order, OrderStatus, StageMode};

use super::combo::{expand_items, normalize_items};
use super::stats::{self, ItemStats, SalesSummary};
use crate::realtime::EventPublisher;
use crate::services::CatalogService;
use crate::storage::{DataStore, Document, FlushTicket, StoreData};
use crate::tokens::{HoldRegistry, is_valid_token};
use crate::utils::ManagerResult;

/// Checkout input
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub counter: Option<Counter>,
    pub items: Vec<CartItemInput>,
    /// Token the terminal wants to use (usually a previewed one)
    pub token: Option<String>,
    /// Client session owning a preview hold
    pub session: Option<String>,
}

/// OrdersManager for token and order operations
#[derive(Clone)]
pub struct OrdersManager {
    store: DataStore,
    catalog: CatalogService,
    publisher: Arc<dyn EventPublisher>,
    holds: Arc<HoldRegistry>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("store", &self.store)
            .field("holds", &self.holds.len())
            .finish()
    }
}

/// Index of the most recently created order carrying `token`
fn newest_with_token(data: &StoreData, token: &str) -> Option<usize> {
    data.orders.iter().rposition(|o| o.token == token)
}

impl OrdersManager {
    pub fn new(store: DataStore, catalog: CatalogService, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            catalog,
            publisher,
            holds: Arc::new(HoldRegistry::new()),
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn holds(&self) -> &HoldRegistry {
        &self.holds
    }

    /// Wait for a flush; failures are logged and the in-memory state is kept
    async fn settle(&self, ticket: FlushTicket, operation: &'static str) {
        if let Err(e) = ticket.wait().await {
            tracing::error!(operation, error = %e, "Change not persisted, will be retried with the next mutation");
        }
    }

    // ========== Tokens ==========

    /// Preview the next token for a counter
    ///
    /// With a session id the previewed token is held: repeated previews return
    /// the same token until checkout consumes it or it stops being reserved.
    pub async fn preview_token(&self, counter: Counter, session: Option<&str>) -> ManagerResult<String> {
        let (token, ticket) = self.store.mutate(|data, changes| {
            if let Some(session) = session
                && let Some(held) = self.holds.get(session, counter)
            {
                if data.tokens.is_reserved(&held) {
                    return Ok(held);
                }
                tracing::debug!(counter = %counter, token = %held, "Held token no longer reserved, allocating a fresh one");
                self.holds.take(session, counter);
            }

            let token = data
                .tokens
                .reserve_sequential(counter)
                .ok_or(ManagerError::TokenExhausted { counter: Some(counter) })?;
            changes.mark_tokens();
            if let Some(session) = session {
                self.holds.set(session, counter, token.clone());
            }
            Ok::<_, ManagerError>(token)
        })?;

        tracing::debug!(counter = %counter, token = %token, "Token previewed");
        self.settle(ticket, "preview_token").await;
        Ok(token)
    }

    /// Reserve a legacy six-digit token
    pub async fn reserve_random(&self) -> ManagerResult<String> {
        let (token, ticket) = self.store.mutate(|data, changes| {
            let token = data
                .tokens
                .reserve_random()
                .ok_or(ManagerError::TokenExhausted { counter: None })?;
            changes.mark(Document::ReservedTokens);
            Ok::<_, ManagerError>(token)
        })?;

        tracing::info!(token = %token, "Random token reserved");
        self.settle(ticket, "reserve_random").await;
        Ok(token)
    }

    /// Reserve an exact token
    pub async fn reserve_specific(&self, token: &str) -> ManagerResult<()> {
        let token = token.trim();
        if !is_valid_token(token) {
            return Err(ManagerError::InvalidToken(token.to_string()));
        }

        let ((), ticket) = self.store.mutate(|data, changes| {
            if !data.tokens.reserve_specific(token) {
                return Err(ManagerError::TokenConflict(token.to_string()));
            }
            changes.mark(Document::ReservedTokens);
            Ok(())
        })?;

        tracing::info!(token = %token, "Token reserved");
        self.settle(ticket, "reserve_specific").await;
        Ok(())
    }

    // ========== Orders ==========

    /// Create an order
    pub async fn checkout(&self, req: CheckoutRequest) -> ManagerResult<Order> {
        let counter = req.counter.unwrap_or(Counter::One);

        if req.items.is_empty() {
            return Err(ManagerError::InvalidOrder("Order has no items".into()));
        }
        let lines = normalize_items(&req.items);
        if lines.is_empty() {
            return Err(ManagerError::InvalidOrder("No items with a positive quantity".into()));
        }
        let items = expand_items(&lines, &self.catalog.snapshot())?;
        if items.is_empty() {
            return Err(ManagerError::InvalidOrder("Order expands to no items".into()));
        }

        let explicit = req
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if let Some(token) = &explicit
            && !is_valid_token(token)
        {
            return Err(ManagerError::InvalidToken(token.clone()));
        }
        let session = req.session.as_deref();

        let (order, ticket) = self.store.mutate(|data, changes| {
            let held = session.and_then(|s| self.holds.get(s, counter));

            let token = match explicit.or_else(|| held.clone()) {
                Some(token) => {
                    let held_here = held.as_deref() == Some(token.as_str());
                    // 已预留且未被其他终端持有的号可以直接使用 (无会话预览)
                    let claimable = data.tokens.is_reserved(&token)
                        && (held_here || !self.holds.is_held(&token));
                    if !claimable && !data.tokens.reserve_specific(&token) {
                        if let Some(s) = session
                            && held_here
                        {
                            self.holds.take(s, counter);
                        }
                        return Err(ManagerError::TokenConflict(token));
                    }
                    token
                }
                None => data
                    .tokens
                    .reserve_sequential(counter)
                    .ok_or(ManagerError::TokenExhausted { counter: Some(counter) })?,
            };

            data.tokens.commit(&token);
            let order = Order::new(token, counter, items);
            data.orders.push(order.clone());
            changes.mark_tokens();
            changes.mark(Document::Orders);

            if let Some(s) = session {
                self.holds.take(s, counter);
            }
            self.publisher
                .publish(Audience::Counter(counter), RealtimeEvent::new_order(&order));
            Ok(order)
        })?;

        tracing::info!(
            token = %order.token,
            counter = %counter,
            items = order.items.len(),
            total = order.total,
            "Order created"
        );
        self.settle(ticket, "checkout").await;
        Ok(order)
    }

    /// Move an order through the kitchen stages
    pub async fn set_processing(&self, token: &str, mode: StageMode) -> ManagerResult<Order> {
        let (order, ticket) = self.store.mutate(|data, changes| {
            let idx = newest_with_token(data, token)
                .ok_or_else(|| ManagerError::OrderNotFound(token.to_string()))?;
            let order = &mut data.orders[idx];
            order.apply_stage(mode);
            changes.mark(Document::Orders);
            self.publisher
                .publish(Audience::Counter(order.server), RealtimeEvent::stage_change(order));
            Ok::<_, ManagerError>(order.clone())
        })?;

        tracing::info!(token = %token, counter = %order.server, stage = ?mode, "Order stage changed");
        self.settle(ticket, "set_processing").await;
        Ok(order)
    }

    /// Complete an order (idempotent, no second event)
    pub async fn complete(&self, token: &str) -> ManagerResult<Order> {
        let ((order, changed), ticket) = self.store.mutate(|data, changes| {
            let idx = newest_with_token(data, token)
                .ok_or_else(|| ManagerError::OrderNotFound(token.to_string()))?;
            let order = &mut data.orders[idx];
            let changed = order.complete();
            if changed {
                changes.mark(Document::Orders);
                self.publisher
                    .publish(Audience::Counter(order.server), RealtimeEvent::completed(order));
            }
            Ok::<_, ManagerError>((order.clone(), changed))
        })?;

        if changed {
            tracing::info!(token = %token, counter = %order.server, "Order completed");
        } else {
            tracing::debug!(token = %token, "Order already completed");
        }
        self.settle(ticket, "complete").await;
        Ok(order)
    }

    /// Orders sorted by `completedAt ?? createdAt`, newest first
    pub fn query(&self, status: Option<OrderStatus>, counter: Option<Counter>) -> Vec<Order> {
        let mut orders: Vec<Order> = self.store.read(|data| {
            data.orders
                .iter()
                .filter(|o| status.is_none_or(|s| o.status == s))
                .filter(|o| counter.is_none_or(|c| o.server == c))
                .cloned()
                .collect()
        });
        orders.sort_by(|a, b| b.activity_time().cmp(&a.activity_time()));
        orders
    }

    pub fn order_count(&self) -> usize {
        self.store.read(|data| data.orders.len())
    }

    // ========== Statistics ==========

    pub fn sales_summary(&self, counter: Option<Counter>) -> SalesSummary {
        let catalog = self.catalog.snapshot();
        self.store
            .read(|data| stats::sales_summary(&data.orders, &catalog, counter))
    }

    pub fn item_stats(&self, id: &str) -> Option<ItemStats> {
        let catalog = self.catalog.snapshot();
        self.store.read(|data| stats::item_stats(&data.orders, &catalog, id))
    }

    // ========== Reset ==========

    /// Restart token sequences (one counter, or both when `None`)
    ///
    /// Orders stay; persistence failures are reported to the caller.
    pub async fn reset_tokens(&self, counter: Option<Counter>) -> ManagerResult<()> {
        let targets: Vec<Counter> = match counter {
            Some(c) => vec![c],
            None => Counter::ALL.to_vec(),
        };

        let ((), ticket) = self.store.mutate(|data, changes| {
            for c in &targets {
                data.tokens.reset_counter(*c);
                self.holds.drop_counter(*c);
            }
            changes.mark_tokens();
            Ok::<_, ManagerError>(())
        })?;

        tracing::warn!(counters = ?targets, "Token sequences reset");
        ticket.wait().await?;
        Ok(())
    }

    /// Wipe orders, tokens, availability and messages
    pub async fn reset_all(&self) -> ManagerResult<()> {
        let (cleared, ticket) = self.store.mutate(|data, changes| {
            let cleared = data.orders.len();
            data.orders.clear();
            data.tokens.reset_all();
            data.availability.clear();
            data.messages.clear();
            self.holds.clear();
            changes.mark_all();
            self.publisher.publish(Audience::All, RealtimeEvent::OrdersCleared);
            Ok::<_, ManagerError>(cleared)
        })?;

        tracing::warn!(orders = cleared, "All data reset");
        ticket.wait().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
