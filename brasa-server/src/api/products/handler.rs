//! Products API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use crate::utils::validation::{MAX_NAME_LEN, validate_amount, validate_required_text};
use shared::models::{Product, ProductCreate, RecipeLineView};

const RESOURCE: &str = "product";

/// GET /api/products - 获取商品列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list()))
}

/// POST /api/products - 新增商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.price, "price")?;
    if let Some(recipe) = &payload.recipe {
        for line in recipe {
            if !line.qty.is_finite() || line.qty <= 0.0 {
                return Err(AppError::validation(format!(
                    "recipe qty must be positive, got {}",
                    line.qty
                )));
            }
        }
    }

    let product = state.catalog.add(payload)?;

    state
        .broadcast_sync(RESOURCE, "created", &product.id, Some(&product));
    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let removed = state.catalog.remove(&id)?;

    state.broadcast_sync::<()>(RESOURCE, "deleted", &id, None);
    Ok(Json(removed))
}

/// GET /api/products/:id/recipe - 配方视图 (原料名即时解析)
pub async fn recipe(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<RecipeLineView>>> {
    Ok(Json(state.catalog.recipe_view(&id, &state.inventory)?))
}
