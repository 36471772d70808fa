//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::error)
//! - 日志、输入校验等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::ok;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use result::{ManagerResult, StorageResult};
