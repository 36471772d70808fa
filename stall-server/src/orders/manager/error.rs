use shared::error::{AppError, ErrorCode};
use shared::models::Counter;
use thiserror::Error;

use crate::storage::StorageError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("No tokens available{}", counter.map(|c| format!(" for counter {c}")).unwrap_or_default())]
    TokenExhausted { counter: Option<Counter> },

    #[error("Token already taken: {0}")]
    TokenConflict(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::TokenExhausted { counter } => {
                let e = AppError::token_exhausted();
                match counter {
                    Some(c) => e.with_detail("counter", c.number()),
                    None => e,
                }
            }
            ManagerError::TokenConflict(token) => AppError::token_conflict(token),
            ManagerError::InvalidToken(token) => AppError::with_message(
                ErrorCode::TokenMalformed,
                format!("Invalid token format: {}", token),
            )
            .with_detail("token", token),
            ManagerError::OrderNotFound(token) => AppError::order_not_found(token),
            ManagerError::InvalidOrder(msg) => AppError::with_message(ErrorCode::OrderEmpty, msg),
            ManagerError::Persistence(e) => {
                // 保留技术细节用于日志，不暴露给终端
                tracing::error!(error = %e, "Persistence failure");
                AppError::new(ErrorCode::StorageWriteFailed)
            }
            ManagerError::Validation(msg) => AppError::validation(msg),
        }
    }
}
