//! Product model

use serde::{Deserialize, Serialize};

/// One recipe line: the stock deducted when one unit of the product sells
///
/// References the material by id only. Views resolve the material name at
/// read time; a renamed material never leaves a stale copy here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub material_id: String,
    pub qty: f64,
}

/// Sellable product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price
    pub price: f64,
    /// May be empty (no inventory impact)
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub recipe: Option<Vec<RecipeLine>>,
}

/// Recipe line joined against the inventory ledger for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLineView {
    pub material_id: String,
    /// None when the material id no longer resolves
    pub name: Option<String>,
    pub qty: f64,
}
