//! Cash register session (收银)
//!
//! One session per device: open with a starting float, close at end of day.
//! The close reads the business day's totals from the sales and expense
//! ledgers, appends exactly one settlement record to cash history, purges
//! the day from both ledgers' current views, and resets the session.
//! Historical closes are never reopened or edited.

use crate::store::{KEY_CASH_HISTORY, KEY_CASH_SESSION, LedgerStore};
use crate::utils::money;
use crate::utils::time::DayRange;
use crate::utils::validation::validate_amount;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::models::{CashCloseRecord, CashSession};
use shared::util::{now_millis, snowflake_str};
use std::sync::Arc;

use super::expenses::ExpenseLedger;
use super::sales::SalesLedger;

#[derive(Debug, Clone, Default)]
struct CashState {
    session: CashSession,
    history: Vec<CashCloseRecord>,
}

/// Register session state container
///
/// Holds explicit references to the two ledgers it settles; there is no
/// ambient lookup.
pub struct CashRegister {
    state: RwLock<CashState>,
    store: Arc<LedgerStore>,
    sales: Arc<SalesLedger>,
    expenses: Arc<ExpenseLedger>,
}

impl CashRegister {
    /// Load session and history from the embedded store
    pub fn load(
        store: Arc<LedgerStore>,
        sales: Arc<SalesLedger>,
        expenses: Arc<ExpenseLedger>,
    ) -> AppResult<Self> {
        let state = CashState {
            session: store.get_json(KEY_CASH_SESSION)?.unwrap_or_default(),
            history: store.get_json(KEY_CASH_HISTORY)?.unwrap_or_default(),
        };
        Ok(Self {
            state: RwLock::new(state),
            store,
            sales,
            expenses,
        })
    }

    // ========== Read views ==========

    pub fn current(&self) -> CashSession {
        self.state.read().session.clone()
    }

    pub fn history(&self) -> Vec<CashCloseRecord> {
        self.state.read().history.clone()
    }

    // ========== Session lifecycle ==========

    /// Open the register with a starting float
    pub fn open(&self, amount: f64) -> AppResult<CashSession> {
        validate_amount(amount, "amount")?;

        let mut guard = self.state.write();
        if guard.session.is_open {
            return Err(AppError::conflict("An open cash session"));
        }

        let mut next = guard.clone();
        next.session = CashSession {
            initial_cash: amount,
            is_open: true,
            opened_at: Some(now_millis()),
        };
        self.store.put_json(KEY_CASH_SESSION, &next.session)?;
        *guard = next;
        Ok(guard.session.clone())
    }

    /// Close the register over the given business day range
    ///
    /// Computes `final_cash = initial_cash + sales_total - expenses_total`,
    /// appends one settlement record, purges the day from the sales current
    /// view and the expenses today view (all-time views keep everything),
    /// and resets the session. Rejected when no session is open.
    pub fn close(&self, range: DayRange) -> AppResult<CashCloseRecord> {
        let record = {
            let mut guard = self.state.write();
            if !guard.session.is_open {
                return Err(AppError::business_rule("No open cash session"));
            }

            let initial_cash = guard.session.initial_cash;
            let sales_total = self.sales.total_in(range);
            let expenses_total = self.expenses.total_in(range);
            let final_cash = money::to_f64(
                money::to_decimal(initial_cash) + money::to_decimal(sales_total)
                    - money::to_decimal(expenses_total),
            );

            let record = CashCloseRecord {
                id: snowflake_str(),
                date: now_millis(),
                initial_cash,
                sales_total,
                expenses_total,
                final_cash,
            };

            let mut next = guard.clone();
            next.history.push(record.clone());
            next.session = CashSession::default();
            self.store.put_json(KEY_CASH_HISTORY, &next.history)?;
            self.store.put_json(KEY_CASH_SESSION, &next.session)?;
            *guard = next;
            record
        };

        // Purge the settled day from both working views
        let purged_sales = self.sales.close_day(range)?;
        let purged_expenses = self.expenses.close_day(range)?;
        tracing::info!(
            close_id = %record.id,
            final_cash = record.final_cash,
            purged_sales,
            purged_expenses,
            "Cash session closed"
        );

        Ok(record)
    }
}

impl std::fmt::Debug for CashRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("CashRegister")
            .field("is_open", &state.session.is_open)
            .field("history", &state.history.len())
            .finish()
    }
}
