use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::counter_filter;
use crate::core::ServerState;
use crate::orders::{ItemStats, SalesSummary};
use crate::utils::{ApiResponse, AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub counter: Option<String>,
}

/// GET /api/stats/summary?counter=
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<ApiResponse<SalesSummary>>> {
    let counter = counter_filter(query.counter.as_deref())?;
    Ok(ok(state.orders.sales_summary(counter)))
}

/// GET /api/stats/item/{id}
pub async fn item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ItemStats>>> {
    let id = id.trim();
    let stats = state
        .orders
        .item_stats(id)
        .ok_or_else(|| AppError::not_found(format!("Item {}", id)))?;
    Ok(ok(stats))
}
