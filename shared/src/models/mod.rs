//! Data models
//!
//! Shared between stall-server and the terminals (via API and realtime events).
//! Field names follow the terminals' JSON (camelCase where they expect it).

pub mod catalog;
pub mod counter;
pub mod message;
pub mod order;

// Re-exports
pub use catalog::*;
pub use counter::*;
pub use message::*;
pub use order::*;
