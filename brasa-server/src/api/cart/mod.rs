//! Cart API 模块 (购物车)

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get).delete(handler::clear))
        .route("/lines", post(handler::add_line))
        .route("/lines/{id}", delete(handler::remove_line))
        .route("/lines/{id}/decrease", post(handler::decrease_line))
}
