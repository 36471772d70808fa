//! Order API Module
//!
//! All mutations go through OrdersManager; realtime events are emitted there.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/checkout", post(handler::checkout))
        .nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{token}/processing", post(handler::set_processing))
        .route("/{token}/complete", post(handler::complete))
}
