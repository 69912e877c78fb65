//! Orders API 模块 (厨房订单)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/active", get(handler::active))
        .route("/closed", get(handler::closed))
        .route("/snapshot", post(handler::snapshot))
        .route("/{id}/advance", post(handler::advance))
}
