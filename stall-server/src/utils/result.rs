//! Unified Result Types
//!
//! Provides type aliases for commonly used Result types across the application

use crate::orders::ManagerError;
use crate::storage::StorageError;

/// Order manager Result type
///
/// Used by token allocation and order lifecycle operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Storage Result type
///
/// Used by document loading and flushing
pub type StorageResult<T> = Result<T, StorageError>;
