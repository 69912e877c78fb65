//! Orders API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::order::{KitchenOrder, OrderAdvance, OrderStatus};

const RESOURCE: &str = "order";

/// GET /api/orders - 全部订单
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<KitchenOrder>>> {
    Ok(Json(state.orders.all()))
}

/// GET /api/orders/active - 厨房待处理队列
pub async fn active(State(state): State<ServerState>) -> AppResult<Json<Vec<KitchenOrder>>> {
    Ok(Json(state.orders.active()))
}

/// GET /api/orders/closed - 已出餐订单
pub async fn closed(State(state): State<ServerState>) -> AppResult<Json<Vec<KitchenOrder>>> {
    Ok(Json(state.orders.closed()))
}

/// POST /api/orders/:id/advance - 推进订单状态
///
/// 只接受状态机的下一步；跳步、回退返回 422。
pub async fn advance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderAdvance>,
) -> AppResult<Json<KitchenOrder>> {
    let (order, _mirror) = state.orders.advance(&id, payload.status).await?;

    let action = if order.status == OrderStatus::Closed {
        "closed"
    } else {
        "updated"
    };
    state.broadcast_sync(RESOURCE, action, &order.id, Some(&order));
    Ok(Json(order))
}

/// Remote snapshot payload, posted by a backend feed bridge
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    pub version: u64,
    pub orders: Vec<KitchenOrder>,
}

/// POST /api/orders/snapshot - 远端快照对账
///
/// 只有版本号严格更新的快照才会替换本地队列；过期快照被丢弃并计数。
/// 返回快照是否被采纳。
pub async fn snapshot(
    State(state): State<ServerState>,
    Json(payload): Json<SnapshotRequest>,
) -> AppResult<Json<bool>> {
    let applied = state
        .orders
        .apply_remote_snapshot(payload.version, payload.orders)?;

    if applied {
        state.broadcast_sync::<()>(RESOURCE, "replaced", "snapshot", None);
    }
    Ok(Json(applied))
}
