//! Cash register session model

use serde::{Deserialize, Serialize};

/// Register session - singleton, one per device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashSession {
    /// Cash in the drawer when the session opened
    pub initial_cash: f64,
    pub is_open: bool,
    /// Unix millis, None while closed
    pub opened_at: Option<i64>,
}

impl Default for CashSession {
    fn default() -> Self {
        Self {
            initial_cash: 0.0,
            is_open: false,
            opened_at: None,
        }
    }
}

/// Open register payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashOpen {
    pub amount: f64,
}

/// Day-close settlement record
///
/// `final_cash = initial_cash + sales_total - expenses_total`. Appended to
/// cash history exactly once per close; never edited or reopened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashCloseRecord {
    pub id: String,
    /// Unix millis of the close
    pub date: i64,
    pub initial_cash: f64,
    pub sales_total: f64,
    pub expenses_total: f64,
    pub final_cash: f64,
}
