//! Sync API 模块 (SSE 订阅)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sync/subscribe", get(handler::subscribe))
}
