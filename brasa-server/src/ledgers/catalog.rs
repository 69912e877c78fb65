//! Product catalog
//!
//! Sellable products with unit price and optional recipe. Products are
//! added and removed, never edited in place. Recipe lines reference
//! materials by id only; name resolution happens in the read view.

use crate::store::{KEY_PRODUCTS, LedgerStore};
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::models::{Product, ProductCreate, RecipeLineView};
use shared::util::snowflake_str;
use std::sync::Arc;

use super::inventory::InventoryLedger;

/// Product state container
pub struct ProductCatalog {
    state: RwLock<Vec<Product>>,
    store: Arc<LedgerStore>,
}

impl ProductCatalog {
    /// Load the catalog from the embedded store
    pub fn load(store: Arc<LedgerStore>) -> AppResult<Self> {
        let products: Vec<Product> = store.get_json(KEY_PRODUCTS)?.unwrap_or_default();
        Ok(Self {
            state: RwLock::new(products),
            store,
        })
    }

    pub fn list(&self) -> Vec<Product> {
        self.state.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<Product> {
        self.state.read().iter().find(|p| p.id == id).cloned()
    }

    /// Register a new product
    pub fn add(&self, data: ProductCreate) -> AppResult<Product> {
        let product = Product {
            id: snowflake_str(),
            name: data.name,
            price: data.price,
            recipe: data.recipe.unwrap_or_default(),
        };

        let mut guard = self.state.write();
        let mut next = guard.clone();
        next.push(product.clone());
        self.store.put_json(KEY_PRODUCTS, &next)?;
        *guard = next;
        Ok(product)
    }

    /// Remove a product; unknown ids are a typed error
    pub fn remove(&self, id: &str) -> AppResult<Product> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let pos = next
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
        let removed = next.remove(pos);
        self.store.put_json(KEY_PRODUCTS, &next)?;
        *guard = next;
        Ok(removed)
    }

    /// Recipe joined against the inventory ledger for display
    ///
    /// Material names are resolved now, not stored, so a renamed material
    /// shows its current name and a vanished one shows None.
    pub fn recipe_view(&self, id: &str, inventory: &InventoryLedger) -> AppResult<Vec<RecipeLineView>> {
        let product = self
            .find(id)
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
        Ok(product
            .recipe
            .iter()
            .map(|line| RecipeLineView {
                material_id: line.material_id.clone(),
                name: inventory.find(&line.material_id).map(|m| m.name),
                qty: line.qty,
            })
            .collect())
    }
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("products", &self.state.read().len())
            .finish()
    }
}
