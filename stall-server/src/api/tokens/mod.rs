//! Token API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/preview-token | POST | 预览下一个令牌 (按 x-session-id 保留) |
//! | /api/reserve-token | POST | 预留六位随机令牌 |
//! | /api/reserve-token/{token} | POST | 预留指定令牌 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/preview-token", post(handler::preview))
        .route("/api/reserve-token", post(handler::reserve_random))
        .route("/api/reserve-token/{token}", post(handler::reserve_specific))
}
