//! Availability API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::Counter;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct CounterQuery {
    #[serde(default)]
    pub counter: Option<Counter>,
}

/// Unavailable ids of one counter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityView {
    pub counter: Counter,
    pub unavailable_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUnavailableRequest {
    #[serde(default)]
    pub counter: Option<Counter>,
    #[serde(default, alias = "unavailable")]
    pub unavailable_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub counter: Option<Counter>,
    pub available: bool,
}

/// GET /api/availability?counter=N
pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<CounterQuery>,
) -> Json<ApiResponse<AvailabilityView>> {
    let counter = query.counter.unwrap_or(Counter::One);
    ok(AvailabilityView {
        counter,
        unavailable_ids: state.availability.unavailable_ids(counter),
    })
}

/// POST /api/availability - replace a counter's unavailable set
pub async fn set(
    State(state): State<ServerState>,
    Json(req): Json<SetUnavailableRequest>,
) -> AppResult<Json<ApiResponse<AvailabilityView>>> {
    let counter = req.counter.unwrap_or(Counter::One);
    let unavailable_ids = state
        .availability
        .set_unavailable(counter, req.unavailable_ids)
        .await?;
    Ok(ok(AvailabilityView {
        counter,
        unavailable_ids,
    }))
}

/// POST /api/availability/{id} - toggle one item
pub async fn toggle(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> AppResult<Json<ApiResponse<AvailabilityView>>> {
    let counter = req.counter.unwrap_or(Counter::One);
    let unavailable_ids = state
        .availability
        .toggle(counter, &id, req.available)
        .await?;
    Ok(ok(AvailabilityView {
        counter,
        unavailable_ids,
    }))
}
