//! Cash API 模块 (收银台)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cash", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::current))
        .route("/open", post(handler::open))
        .route("/close", post(handler::close))
        .route("/history", get(handler::history))
}
