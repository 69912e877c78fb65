//! Raw material model

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw material entity
///
/// `qty` never goes below zero: consumption clamps at 0, and the sale path
/// checks and deducts in one critical section so the clamp does not fire on
/// the happy path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMaterial {
    pub id: String,
    pub name: String,
    pub qty: f64,
}

/// Create material payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialCreate {
    pub name: String,
    /// Initial quantity (default 0)
    #[serde(default)]
    pub qty: f64,
}

/// Restock / consume payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub amount: f64,
}

/// Recipe cannot be satisfied from current stock
///
/// Reported for the first short line; stock is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Insufficient stock of {name}: need {required}, have {available}")]
pub struct StockShortage {
    pub material_id: String,
    pub name: String,
    pub required: f64,
    pub available: f64,
}
