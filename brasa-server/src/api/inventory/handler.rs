//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, validate_amount, validate_required_text};
use shared::models::{MaterialCreate, RawMaterial, RecipeLine, StockAdjust};

const RESOURCE: &str = "inventory";

/// GET /api/inventory - 获取库存列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<RawMaterial>>> {
    Ok(Json(state.inventory.list()))
}

/// POST /api/inventory - 新增原料
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MaterialCreate>,
) -> AppResult<Json<RawMaterial>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.qty, "qty")?;

    let (material, _mirror) = state.inventory.add_material(payload).await?;

    state
        .broadcast_sync(RESOURCE, "created", &material.id, Some(&material));
    Ok(Json(material))
}

/// POST /api/inventory/:id/restock - 进货
pub async fn restock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<RawMaterial>> {
    validate_amount(payload.amount, "amount")?;

    let (material, _mirror) = state.inventory.restock(&id, payload.amount).await?;

    state
        .broadcast_sync(RESOURCE, "updated", &material.id, Some(&material));
    Ok(Json(material))
}

/// POST /api/inventory/:id/consume - 消耗 (下限 0)
pub async fn consume(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<RawMaterial>> {
    validate_amount(payload.amount, "amount")?;

    let (material, _mirror) = state.inventory.consume(&id, payload.amount).await?;

    state
        .broadcast_sync(RESOURCE, "updated", &material.id, Some(&material));
    Ok(Json(material))
}

/// Availability check payload
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub recipe: Vec<RecipeLine>,
    #[serde(default = "default_multiplier")]
    pub multiplier: i32,
}

fn default_multiplier() -> i32 {
    1
}

/// POST /api/inventory/check - 配方可售检查
pub async fn check(
    State(state): State<ServerState>,
    Json(payload): Json<CheckRequest>,
) -> AppResult<Json<bool>> {
    Ok(Json(
        state
            .inventory
            .check_availability(&payload.recipe, payload.multiplier),
    ))
}
