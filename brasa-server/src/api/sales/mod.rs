//! Sales API 模块 (销售确认和账本)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::by_date))
        .route("/confirm", post(handler::confirm))
        .route("/current", get(handler::current))
        .route("/all", get(handler::all_time))
}
