//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use crate::utils::validation::{MAX_OPTION_LEN, validate_amount};
use shared::models::{CartAdd, CartLine};

/// GET /api/cart - 当前购物车
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<Vec<CartLine>>> {
    Ok(Json(state.sales.cart()))
}

/// POST /api/cart/lines - 加入一份商品
///
/// 相同 (product_id, options) 的行合并计数，否则新增一行。
pub async fn add_line(
    State(state): State<ServerState>,
    Json(payload): Json<CartAdd>,
) -> AppResult<Json<CartLine>> {
    if let Some(price) = payload.unit_price {
        validate_amount(price, "unit_price")?;
    }
    for option in payload.options.sauces.iter().chain(payload.options.extras.iter()) {
        if option.len() > MAX_OPTION_LEN {
            return Err(AppError::validation(format!(
                "option is too long ({} chars, max {MAX_OPTION_LEN})",
                option.len()
            )));
        }
    }

    let product = state
        .catalog
        .find(&payload.product_id)
        .ok_or_else(|| AppError::not_found(format!("Product {}", payload.product_id)))?;

    let line = state
        .sales
        .add_to_cart(&product, payload.unit_price, payload.options)?;
    Ok(Json(line))
}

/// POST /api/cart/lines/:id/decrease - 减一份，归零移除
pub async fn decrease_line(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<CartLine>>> {
    Ok(Json(state.sales.decrease_line(&id)?))
}

/// DELETE /api/cart/lines/:id - 删除整行
pub async fn remove_line(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CartLine>> {
    Ok(Json(state.sales.remove_line(&id)?))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(State(state): State<ServerState>) -> AppResult<Json<bool>> {
    state.sales.clear_cart()?;
    Ok(Json(true))
}
