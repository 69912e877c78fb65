//! Inventory API 模块 (库存管理)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/check", post(handler::check))
        .route("/{id}/restock", post(handler::restock))
        .route("/{id}/consume", post(handler::consume))
}
