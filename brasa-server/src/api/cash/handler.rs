//! Cash API Handlers (日结)

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{CashCloseRecord, CashOpen, CashSession};

const RESOURCE: &str = "cash";

/// GET /api/cash - 当前收银状态
pub async fn current(State(state): State<ServerState>) -> AppResult<Json<CashSession>> {
    Ok(Json(state.cash.current()))
}

/// GET /api/cash/history - 日结历史
pub async fn history(State(state): State<ServerState>) -> AppResult<Json<Vec<CashCloseRecord>>> {
    Ok(Json(state.cash.history()))
}

/// POST /api/cash/open - 开台 (底金)
pub async fn open(
    State(state): State<ServerState>,
    Json(payload): Json<CashOpen>,
) -> AppResult<Json<CashSession>> {
    let session = state.cash.open(payload.amount)?;

    state.broadcast_sync(RESOURCE, "opened", "session", Some(&session));
    Ok(Json(session))
}

/// POST /api/cash/close - 日结
///
/// 按当前营业日范围结算：汇总销售和支出、追加一条日结记录、
/// 清空两个账本的当日视图、关闭收银台。
pub async fn close(State(state): State<ServerState>) -> AppResult<Json<CashCloseRecord>> {
    let range = state.business_day_range();
    let record = state.cash.close(range)?;

    state.broadcast_sync(RESOURCE, "closed", &record.id, Some(&record));
    Ok(Json(record))
}
