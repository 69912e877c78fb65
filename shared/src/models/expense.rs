//! Expense model

use super::sale::SaleRecord;
use serde::{Deserialize, Serialize};

/// Recorded expense
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// Unix millis
    pub date: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub amount: f64,
    pub description: Option<String>,
}

/// Combined movement history entry
///
/// Sales and expenses interleave in one feed for the reports screen. The
/// wire tags keep the original ledger vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum HistoryEntry {
    #[serde(rename = "venta")]
    Sale(SaleRecord),
    #[serde(rename = "gasto")]
    Expense(ExpenseRecord),
}

impl HistoryEntry {
    /// Timestamp of the underlying record (Unix millis)
    pub fn date(&self) -> i64 {
        match self {
            Self::Sale(s) => s.date,
            Self::Expense(e) => e.date,
        }
    }
}
