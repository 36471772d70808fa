//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，终端与服务端共用同一套错误码。
//! 本模块负责 re-export 以及成功响应的便捷构造。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::order_not_found("B12"))
//!
//! // 返回成功响应
//! Ok(ok(order))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
