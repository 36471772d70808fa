//! Order API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use http::{HeaderMap, header};
use serde::Deserialize;
use shared::models::{CartItemInput, Counter, Order, OrderStatus, StageMode};

use crate::api::{counter_filter, session_id};
use crate::core::ServerState;
use crate::orders::CheckoutRequest;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Checkout body sent by the billing terminal
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    #[serde(default)]
    pub counter: Option<Counter>,
    #[serde(default)]
    pub items: Vec<CartItemInput>,
    #[serde(default)]
    pub token: Option<String>,
}

/// POST /api/checkout
pub async fn checkout(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders
        .checkout(CheckoutRequest {
            counter: body.counter,
            items: body.items,
            token: body.token,
            session: session_id(&headers),
        })
        .await?;
    Ok(ok(order))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub counter: Option<String>,
}

/// GET /api/orders?status=&counter=
///
/// status 默认 `pending`，`all` 表示不过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = OrderStatus::parse_filter(query.status.as_deref().unwrap_or("pending"))
        .map_err(AppError::validation)?;
    let counter = counter_filter(query.counter.as_deref())?;
    let orders = state.orders.query(status, counter);
    Ok(([(header::CACHE_CONTROL, "no-store")], ok(orders)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessingBody {
    #[serde(default)]
    pub processing: StageMode,
}

/// POST /api/orders/{token}/processing
///
/// Body `{"processing": true | false | "ready"}`; an empty body means `true`.
pub async fn set_processing(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Order>>> {
    let body: ProcessingBody = if body.iter().all(u8::is_ascii_whitespace) {
        ProcessingBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::invalid_request(format!("invalid processing body: {}", e)))?
    };
    let order = state.orders.set_processing(&token, body.processing).await?;
    Ok(ok(order))
}

/// POST /api/orders/{token}/complete
pub async fn complete(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.complete(&token).await?;
    Ok(ok(order))
}
