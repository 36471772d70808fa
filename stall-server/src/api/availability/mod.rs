//! Availability API Module (沽清)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/availability", get(handler::get).post(handler::set))
        .route("/api/availability/{id}", post(handler::toggle))
}
