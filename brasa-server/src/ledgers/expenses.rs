//! Expense ledger
//!
//! Expenses live in three parallel views: today's list (purged at
//! day-close), the all-time list, and the combined movement history where
//! they interleave with sale entries. Deleting an expense removes it from
//! all three and, best effort, from the remote store by logical id.

use crate::remote::{Mirror, MirrorOp, MirrorStatus};
use crate::store::{
    KEY_EXPENSES_ALL_TIME, KEY_EXPENSES_HISTORY, KEY_EXPENSES_TODAY, LedgerStore,
};
use crate::utils::money;
use crate::utils::time::DayRange;
use crate::utils::validation::{MAX_DESCRIPTION_LEN, validate_amount, validate_optional_text};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{ExpenseCreate, ExpenseRecord, HistoryEntry, SaleRecord};
use shared::util::{now_millis, snowflake_str};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpenseState {
    today: Vec<ExpenseRecord>,
    all_time: Vec<ExpenseRecord>,
    history: Vec<HistoryEntry>,
}

/// Expense state container
pub struct ExpenseLedger {
    state: RwLock<ExpenseState>,
    store: Arc<LedgerStore>,
    mirror: Arc<Mirror>,
}

impl ExpenseLedger {
    /// Load all three views from the embedded store
    pub fn load(store: Arc<LedgerStore>, mirror: Arc<Mirror>) -> AppResult<Self> {
        let state = ExpenseState {
            today: store.get_json(KEY_EXPENSES_TODAY)?.unwrap_or_default(),
            all_time: store.get_json(KEY_EXPENSES_ALL_TIME)?.unwrap_or_default(),
            history: store.get_json(KEY_EXPENSES_HISTORY)?.unwrap_or_default(),
        };
        Ok(Self {
            state: RwLock::new(state),
            store,
            mirror,
        })
    }

    // ========== Read views ==========

    pub fn today(&self) -> Vec<ExpenseRecord> {
        self.state.read().today.clone()
    }

    pub fn all_time(&self) -> Vec<ExpenseRecord> {
        self.state.read().all_time.clone()
    }

    /// Combined sale/expense movement feed
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.read().history.clone()
    }

    /// Sum of today-view expenses inside the range (decimal arithmetic)
    pub fn total_in(&self, range: DayRange) -> f64 {
        let sum = self
            .state
            .read()
            .today
            .iter()
            .filter(|e| range.contains(e.date))
            .fold(rust_decimal::Decimal::ZERO, |acc, e| {
                acc + money::to_decimal(e.amount)
            });
        money::to_f64(sum)
    }

    // ========== Mutations ==========

    /// Record an expense
    pub async fn record(&self, data: ExpenseCreate) -> AppResult<(ExpenseRecord, MirrorStatus)> {
        validate_amount(data.amount, "amount")?;
        if data.amount == 0.0 {
            return Err(AppError::validation("amount must be greater than zero"));
        }
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;

        let record = ExpenseRecord {
            id: snowflake_str(),
            description: data.description.unwrap_or_default(),
            amount: data.amount,
            date: now_millis(),
        };

        {
            let mut guard = self.state.write();
            let mut next = guard.clone();
            next.today.insert(0, record.clone());
            next.all_time.insert(0, record.clone());
            next.history.insert(0, HistoryEntry::Expense(record.clone()));
            self.persist(&next)?;
            *guard = next;
        }

        let status = self
            .mirror
            .dispatch(
                MirrorOp::Push {
                    collection: "expenses".to_string(),
                },
                serde_json::to_value(HistoryEntry::Expense(record.clone())).unwrap_or_default(),
            )
            .await;
        Ok((record, status))
    }

    /// Delete an expense from all three views
    ///
    /// The remote side is cleaned up by logical id: the remote store keys
    /// records with its own generated keys, so the mirror scans the
    /// collection for the matching `id` field.
    pub async fn delete(&self, id: &str) -> AppResult<MirrorStatus> {
        {
            let mut guard = self.state.write();
            if !guard.all_time.iter().any(|e| e.id == id) {
                return Err(AppError::not_found(format!("Expense {id}")));
            }
            let mut next = guard.clone();
            next.today.retain(|e| e.id != id);
            next.all_time.retain(|e| e.id != id);
            next.history
                .retain(|h| !matches!(h, HistoryEntry::Expense(e) if e.id == id));
            self.persist(&next)?;
            *guard = next;
        }

        let status = self
            .mirror
            .dispatch(
                MirrorOp::DeleteByLogicalId {
                    collection: "expenses".to_string(),
                    logical_id: id.to_string(),
                },
                serde_json::Value::Null,
            )
            .await;
        Ok(status)
    }

    /// Append a sale entry to the combined history
    pub fn record_sale_entry(&self, sale: &SaleRecord) -> AppResult<()> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        next.history.insert(0, HistoryEntry::Sale(sale.clone()));
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    /// Purge the business day's expenses from the today view only
    ///
    /// All-time and combined history retain them. Returns how many records
    /// left the today view.
    pub fn close_day(&self, range: DayRange) -> AppResult<usize> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let before = next.today.len();
        next.today.retain(|e| !range.contains(e.date));
        let purged = before - next.today.len();
        self.persist(&next)?;
        *guard = next;
        Ok(purged)
    }

    fn persist(&self, state: &ExpenseState) -> AppResult<()> {
        self.store.put_json(KEY_EXPENSES_TODAY, &state.today)?;
        self.store.put_json(KEY_EXPENSES_ALL_TIME, &state.all_time)?;
        self.store.put_json(KEY_EXPENSES_HISTORY, &state.history)?;
        Ok(())
    }
}

impl std::fmt::Debug for ExpenseLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ExpenseLedger")
            .field("today", &state.today.len())
            .field("all_time", &state.all_time.len())
            .field("history", &state.history.len())
            .finish()
    }
}
