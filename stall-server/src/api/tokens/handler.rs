//! Token API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use shared::models::Counter;

use crate::api::session_id;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub counter: Option<Counter>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/preview-token
pub async fn preview(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<PreviewRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let counter = req.counter.unwrap_or(Counter::One);
    let session = session_id(&headers);
    let token = state
        .orders
        .preview_token(counter, session.as_deref())
        .await?;
    Ok(ok(TokenResponse { token }))
}

/// POST /api/reserve-token
pub async fn reserve_random(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let token = state.orders.reserve_random().await?;
    Ok(ok(TokenResponse { token }))
}

/// POST /api/reserve-token/{token}
pub async fn reserve_specific(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    state.orders.reserve_specific(&token).await?;
    Ok(ok(TokenResponse {
        token: token.trim().to_string(),
    }))
}
