//! Cart and sale models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-line option selection
///
/// Two cart lines coalesce only when product id AND options match, so the
/// sets use `BTreeSet` for order-independent structural equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemOptions {
    #[serde(default)]
    pub sauces: BTreeSet<String>,
    #[serde(default)]
    pub extras: BTreeSet<String>,
}

impl ItemOptions {
    pub fn is_empty(&self) -> bool {
        self.sauces.is_empty() && self.extras.is_empty()
    }
}

/// In-progress cart line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Line id; survives concurrent cart mutation, unlike a list index
    pub line_id: String,
    pub product_id: String,
    /// Product name snapshot
    pub name: String,
    /// Unit price, extras already baked in
    pub price: f64,
    pub qty: i32,
    #[serde(default)]
    pub options: ItemOptions,
}

/// Sold line snapshot inside a sale record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldLine {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub qty: i32,
    #[serde(default)]
    pub options: ItemOptions,
}

impl From<&CartLine> for SoldLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.price,
            qty: line.qty,
            options: line.options.clone(),
        }
    }
}

/// Completed sale - immutable once created
///
/// Prepended to both the current-day ledger (purged at day-close) and the
/// all-time ledger (never purged).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub id: String,
    pub products: Vec<SoldLine>,
    /// Sum of price * qty over all lines, 2 decimal places
    pub total: f64,
    /// Unix millis
    pub date: i64,
}

/// Add to cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAdd {
    pub product_id: String,
    /// Unit price override (extras baked in by the caller)
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub options: ItemOptions,
}

/// Confirm sale payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmSale {
    /// Sell these lines instead of the cart (quick-sale path)
    pub lines: Option<Vec<SoldLine>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_equality_ignores_insertion_order() {
        let mut a = ItemOptions::default();
        a.sauces.insert("bbq".into());
        a.sauces.insert("garlic".into());

        let mut b = ItemOptions::default();
        b.sauces.insert("garlic".into());
        b.sauces.insert("bbq".into());

        assert_eq!(a, b);
    }

    #[test]
    fn differing_extras_are_not_equal() {
        let a = ItemOptions::default();
        let mut b = ItemOptions::default();
        b.extras.insert("cheese".into());
        assert_ne!(a, b);
        assert!(a.is_empty());
        assert!(!b.is_empty());
    }
}
