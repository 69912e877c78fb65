//! Expenses API 模块 (支出管理)

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/expenses", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::today).post(handler::create))
        .route("/all", get(handler::all_time))
        .route("/history", get(handler::history))
        .route("/{id}", delete(handler::remove))
}
