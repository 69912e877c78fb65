//! Expenses API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{ExpenseCreate, ExpenseRecord, HistoryEntry};

const RESOURCE: &str = "expense";

/// GET /api/expenses - 今日支出
pub async fn today(State(state): State<ServerState>) -> AppResult<Json<Vec<ExpenseRecord>>> {
    Ok(Json(state.expenses.today()))
}

/// GET /api/expenses/all - 全量支出
pub async fn all_time(State(state): State<ServerState>) -> AppResult<Json<Vec<ExpenseRecord>>> {
    Ok(Json(state.expenses.all_time()))
}

/// GET /api/expenses/history - 销售/支出合并流水
pub async fn history(State(state): State<ServerState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.expenses.history()))
}

/// POST /api/expenses - 记录支出
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCreate>,
) -> AppResult<Json<ExpenseRecord>> {
    let (record, _mirror) = state.expenses.record(payload).await?;

    state.broadcast_sync(RESOURCE, "created", &record.id, Some(&record));
    Ok(Json(record))
}

/// DELETE /api/expenses/:id - 删除支出 (本地三视图 + 远端按逻辑 id)
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.expenses.delete(&id).await?;

    state.broadcast_sync::<()>(RESOURCE, "deleted", &id, None);
    Ok(Json(true))
}
