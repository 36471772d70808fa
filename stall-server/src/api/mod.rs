//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`items`] - 菜单
//! - [`tokens`] - 令牌预览 / 预留
//! - [`orders`] - 下单、订单查询、厨房阶段
//! - [`availability`] - 沽清
//! - [`messages`] - 柜台留言
//! - [`statistics`] - 销售统计
//! - [`admin`] - 重置
//!
//! WebSocket 入口 `/ws` 在 [`crate::realtime::ws`]。

pub mod admin;
pub mod availability;
pub mod health;
pub mod items;
pub mod messages;
pub mod orders;
pub mod statistics;
pub mod tokens;

use axum::Router;
use axum::routing::get;
use http::HeaderMap;
use shared::models::Counter;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::realtime::ws::handle_ws;
use crate::utils::{AppError, AppResult};

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, ok};

/// Header carrying the terminal's session id (preview holds)
pub const SESSION_HEADER: &str = "x-session-id";

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(items::router())
        .merge(tokens::router())
        .merge(orders::router())
        .merge(availability::router())
        .merge(messages::router())
        .merge(statistics::router())
        .merge(admin::router())
        .route("/ws", get(handle_ws))
}

/// Build the application with all middleware
///
/// Used by the HTTP server and by oneshot tests
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
}

/// Session id from the request headers (blank → none)
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a `counter` query parameter: `1`, `2`, `all` or absent
pub fn counter_filter(raw: Option<&str>) -> AppResult<Option<Counter>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<u8>()
            .ok()
            .and_then(|n| Counter::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("invalid counter: {}", value))),
    }
}
