//! Admin API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::Counter;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// What a reset wipes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetScope {
    /// Restart token sequences, orders stay
    #[default]
    Tokens,
    /// Orders, tokens, availability and messages
    All,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub scope: ResetScope,
    #[serde(default)]
    pub password: String,
    /// Token reset target; both counters when absent
    #[serde(default)]
    pub counter: Option<Counter>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub scope: ResetScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<Counter>,
}

/// POST /api/admin/reset
pub async fn reset(
    State(state): State<ServerState>,
    Json(req): Json<ResetRequest>,
) -> AppResult<Json<ApiResponse<ResetResponse>>> {
    if req.password != state.config.admin_password {
        tracing::warn!(scope = ?req.scope, "Reset rejected: invalid password");
        return Err(AppError::invalid_credentials());
    }

    match req.scope {
        ResetScope::All => {
            state.orders.reset_all().await?;
            Ok(ok(ResetResponse {
                scope: ResetScope::All,
                counter: None,
            }))
        }
        ResetScope::Tokens => {
            state.orders.reset_tokens(req.counter).await?;
            Ok(ok(ResetResponse {
                scope: ResetScope::Tokens,
                counter: req.counter,
            }))
        }
    }
}
