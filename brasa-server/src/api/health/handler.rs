//! Health API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;

/// Health report
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    /// Instance id; changes on every restart so clients resync
    pub epoch: String,
    pub mirror_enabled: bool,
    /// Queued remote writes waiting for the flush loop
    pub outbox_pending: u64,
}

/// GET /api/health - 健康检查
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<Health>> {
    Ok(Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.epoch().to_string(),
        mirror_enabled: state.mirror.is_enabled(),
        outbox_pending: state.mirror.pending(),
    }))
}
