//! Admin API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/reset | POST | 重置令牌 (单个柜台或全部) / 清空所有数据 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/reset", post(handler::reset))
}
