//! Counter message API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{Counter, CounterMessage, MessageSide};

use crate::api::counter_filter;
use crate::core::ServerState;
use crate::services::messages::merge_broadcasts;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub counter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub counter: Option<Counter>,
    #[serde(default)]
    pub side: MessageSide,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
    /// Admin message to every counter
    #[serde(default)]
    pub broadcast: bool,
}

/// GET /api/messages?counter=
///
/// 不指定柜台时返回全部留言，管理员广播合并为一条
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<CounterMessage>>>> {
    let messages = match counter_filter(query.counter.as_deref())? {
        Some(counter) => state.messages.list(Some(counter)),
        None => merge_broadcasts(state.messages.list(None)),
    };
    Ok(ok(messages))
}

/// POST /api/messages
pub async fn post(
    State(state): State<ServerState>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<Json<ApiResponse<Vec<CounterMessage>>>> {
    let posted = if req.broadcast {
        state.messages.broadcast(&req.text, req.user).await?
    } else {
        let counter = req.counter.unwrap_or(Counter::One);
        vec![
            state
                .messages
                .add(counter, req.side, &req.text, req.user)
                .await?,
        ]
    };
    Ok(ok(posted))
}
