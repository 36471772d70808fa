//! Shared types for the stall coordinator
//!
//! Common types used by the server and its terminals: counters, orders,
//! catalog entries, realtime events, error codes and response structures.

pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Realtime re-exports (for convenient access)
pub use message::{Audience, EventType, RealtimeEvent};

// Model re-exports
pub use models::{Counter, Order, OrderStatus, StageMode};
