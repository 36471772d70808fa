//! Item catalog API

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use http::header;
use shared::models::CatalogItem;

use crate::core::ServerState;
use crate::utils::{ApiResponse, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/items", get(list))
}

/// GET /api/items - 每次请求重新读取菜单文件
pub async fn list(State(state): State<ServerState>) -> impl IntoResponse {
    let catalog = state.catalog.reload().await;
    let items: Json<ApiResponse<Vec<CatalogItem>>> = ok(catalog.items().to_vec());
    ([(header::CACHE_CONTROL, "no-store")], items)
}
