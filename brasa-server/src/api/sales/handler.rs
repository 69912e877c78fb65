//! Sales API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::checkout::CheckoutReceipt;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::time;
use crate::utils::validation::{validate_amount, validate_qty};
use shared::models::{ConfirmSale, SaleRecord};

/// POST /api/sales/confirm - 确认销售
///
/// 购物车为空时返回 null (幂等空操作)。响应中的 `mirror` 字段报告远端
/// 镜像结果，调用方据此决定是否提示收银员。
pub async fn confirm(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmSale>,
) -> AppResult<Json<Option<CheckoutReceipt>>> {
    if let Some(lines) = &payload.lines {
        for line in lines {
            validate_amount(line.price, "price")?;
            validate_qty(line.qty, "qty")?;
        }
    }

    let receipt = state.checkout.confirm_sale(payload.lines).await?;

    if let Some(receipt) = &receipt {
        state.broadcast_sync("sale", "created", &receipt.sale.id, Some(&receipt.sale));
        for order in &receipt.orders {
            state.broadcast_sync("order", "created", &order.id, Some(order));
        }
    }
    Ok(Json(receipt))
}

/// GET /api/sales/current - 当日账本 (day-close 清空)
pub async fn current(State(state): State<ServerState>) -> AppResult<Json<Vec<SaleRecord>>> {
    Ok(Json(state.sales.current()))
}

/// GET /api/sales/all - 全量账本 (永不清空)
pub async fn all_time(State(state): State<ServerState>) -> AppResult<Json<Vec<SaleRecord>>> {
    Ok(Json(state.sales.all_time()))
}

/// Date filter query
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// YYYY-MM-DD (业务时区)
    pub date: String,
}

/// GET /api/sales?date=YYYY-MM-DD - 按日筛选当日账本
pub async fn by_date(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<SaleRecord>>> {
    let date = time::parse_date(&query.date)?;
    let range = time::calendar_day_range(date, state.config.timezone);
    Ok(Json(state.sales.sales_in(range)))
}
