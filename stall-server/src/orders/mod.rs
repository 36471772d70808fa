//! Order lifecycle
//!
//! - **manager**: OrdersManager, token reconciliation and kitchen stages
//! - **combo**: cart normalization and combo expansion
//! - **stats**: sales / item statistics over completed orders
//!
//! # Data Flow
//!
//! ```text
//! checkout → OrdersManager ── lock ──► TokenAllocator + orders
//!                 │                          │
//!                 ├── publish (counter room) │
//!                 └── await flush ◄──────────┘
//! ```

pub mod combo;
pub mod manager;
pub mod stats;

// Re-exports
pub use combo::{CartLine, expand_items, normalize_items};
pub use manager::{CheckoutRequest, ManagerError, OrdersManager};
pub use stats::{ItemStats, SalesSummary};
