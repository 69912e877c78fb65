//! Inventory ledger (库存)
//!
//! Holds raw-material quantities. Quantities never go below zero: plain
//! consumption clamps at 0, while the sale path uses [`take_requirements`]
//! — check and deduct inside one critical section — so the clamp cannot
//! fire there and a concurrent consumer cannot slip between the check and
//! the deduction.
//!
//! [`take_requirements`]: InventoryLedger::take_requirements

use crate::remote::{Mirror, MirrorOp, MirrorStatus};
use crate::store::{KEY_INVENTORY, LedgerStore};
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::models::{MaterialCreate, RawMaterial, RecipeLine, StockShortage};
use shared::util::snowflake_str;
use std::sync::Arc;

/// Raw material state container
pub struct InventoryLedger {
    state: RwLock<Vec<RawMaterial>>,
    store: Arc<LedgerStore>,
    mirror: Arc<Mirror>,
    /// Remote namespace: `inventories/{store_key}`
    remote_root: String,
}

impl InventoryLedger {
    /// Load the ledger from the embedded store
    pub fn load(store: Arc<LedgerStore>, mirror: Arc<Mirror>, store_key: &str) -> AppResult<Self> {
        let materials: Vec<RawMaterial> = store.get_json(KEY_INVENTORY)?.unwrap_or_default();
        Ok(Self {
            state: RwLock::new(materials),
            store,
            mirror,
            remote_root: format!("inventories/{store_key}"),
        })
    }

    // ========== Read views ==========

    pub fn list(&self) -> Vec<RawMaterial> {
        self.state.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<RawMaterial> {
        self.state.read().iter().find(|m| m.id == id).cloned()
    }

    /// Every recipe line satisfiable from current stock?
    pub fn check_availability(&self, recipe: &[RecipeLine], multiplier: i32) -> bool {
        let state = self.state.read();
        recipe.iter().all(|line| {
            state
                .iter()
                .find(|m| m.id == line.material_id)
                .is_some_and(|m| m.qty >= line.qty * f64::from(multiplier))
        })
    }

    // ========== Mutations ==========

    /// Register a new raw material
    pub async fn add_material(&self, data: MaterialCreate) -> AppResult<(RawMaterial, MirrorStatus)> {
        let material = RawMaterial {
            id: snowflake_str(),
            name: data.name,
            qty: data.qty,
        };

        {
            let mut guard = self.state.write();
            let mut next = guard.clone();
            next.push(material.clone());
            self.store.put_json(KEY_INVENTORY, &next)?;
            *guard = next;
        }

        let status = self
            .mirror
            .dispatch(
                MirrorOp::Set {
                    path: format!("{}/{}", self.remote_root, material.id),
                },
                serde_json::to_value(&material).unwrap_or_default(),
            )
            .await;
        Ok((material, status))
    }

    /// Add stock: qty += amount
    pub async fn restock(&self, id: &str, amount: f64) -> AppResult<(RawMaterial, MirrorStatus)> {
        let updated = self.adjust(id, amount)?;
        let status = self.mirror_qty(&updated).await;
        Ok((updated, status))
    }

    /// Remove stock: qty = max(0, qty - amount)
    pub async fn consume(&self, id: &str, amount: f64) -> AppResult<(RawMaterial, MirrorStatus)> {
        let updated = self.adjust(id, -amount)?;
        let status = self.mirror_qty(&updated).await;
        Ok((updated, status))
    }

    /// Apply a recipe `multiplier` times, consuming every line
    ///
    /// Unknown material ids are skipped: a recipe may reference a material
    /// that no longer exists, and the remaining lines still apply. Clamps at
    /// zero like plain [`consume`](Self::consume).
    pub async fn consume_by_recipe(
        &self,
        recipe: &[RecipeLine],
        multiplier: i32,
    ) -> AppResult<MirrorStatus> {
        let affected = self.apply_recipe(recipe, -f64::from(multiplier))?;
        Ok(self.mirror_all(&affected).await)
    }

    /// Inverse of [`consume_by_recipe`](Self::consume_by_recipe), used to
    /// undo a cancelled or failed sale
    pub async fn return_by_recipe(
        &self,
        recipe: &[RecipeLine],
        multiplier: i32,
    ) -> AppResult<MirrorStatus> {
        let affected = self.apply_recipe(recipe, f64::from(multiplier))?;
        Ok(self.mirror_all(&affected).await)
    }

    /// Check and deduct a single recipe, `multiplier` units, atomically
    pub fn take_for_recipe(
        &self,
        recipe: &[RecipeLine],
        multiplier: i32,
    ) -> Result<Vec<RawMaterial>, TakeError> {
        let requirements: Vec<(String, f64)> = recipe
            .iter()
            .map(|line| (line.material_id.clone(), line.qty * f64::from(multiplier)))
            .collect();
        self.take_requirements(&requirements)
    }

    /// Check and deduct aggregated requirements in one critical section
    ///
    /// `requirements` pairs material ids with total required quantities.
    /// On any shortage the ledger is left untouched and the first short
    /// line is reported. An unknown material id counts as zero stock.
    pub fn take_requirements(
        &self,
        requirements: &[(String, f64)],
    ) -> Result<Vec<RawMaterial>, TakeError> {
        let mut guard = self.state.write();

        // Check phase: everything must be available before anything moves
        for (material_id, required) in requirements {
            let available = guard
                .iter()
                .find(|m| &m.id == material_id)
                .map(|m| m.qty)
                .unwrap_or(0.0);
            if available < *required {
                let name = guard
                    .iter()
                    .find(|m| &m.id == material_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| material_id.clone());
                return Err(TakeError::Shortage(StockShortage {
                    material_id: material_id.clone(),
                    name,
                    required: *required,
                    available,
                }));
            }
        }

        // Commit phase
        let mut next = guard.clone();
        let mut affected = Vec::new();
        for (material_id, required) in requirements {
            if let Some(material) = next.iter_mut().find(|m| &m.id == material_id) {
                material.qty -= required;
                affected.push(material.clone());
            }
        }
        self.store
            .put_json(KEY_INVENTORY, &next)
            .map_err(|e| TakeError::Storage(e.to_string()))?;
        *guard = next;
        Ok(affected)
    }

    /// Return previously taken requirements (compensation path)
    pub fn give_back_requirements(&self, requirements: &[(String, f64)]) -> AppResult<Vec<RawMaterial>> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let mut affected = Vec::new();
        for (material_id, amount) in requirements {
            if let Some(material) = next.iter_mut().find(|m| &m.id == material_id) {
                material.qty += amount;
                affected.push(material.clone());
            }
        }
        self.store.put_json(KEY_INVENTORY, &next)?;
        *guard = next;
        Ok(affected)
    }

    /// Mirror updated quantities for a batch of materials
    pub async fn mirror_all(&self, materials: &[RawMaterial]) -> MirrorStatus {
        let mut status = MirrorStatus::Delivered;
        for material in materials {
            status = status.combine(self.mirror_qty(material).await);
        }
        status
    }

    // ========== Internals ==========

    /// qty += delta, clamped at zero; NotFound for unknown ids
    fn adjust(&self, id: &str, delta: f64) -> AppResult<RawMaterial> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let material = next
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::not_found(format!("Material {id}")))?;
        material.qty = (material.qty + delta).max(0.0);
        let updated = material.clone();
        self.store.put_json(KEY_INVENTORY, &next)?;
        *guard = next;
        Ok(updated)
    }

    /// Apply recipe with signed multiplier; unknown ids skipped
    fn apply_recipe(&self, recipe: &[RecipeLine], multiplier: f64) -> AppResult<Vec<RawMaterial>> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let mut affected = Vec::new();
        for line in recipe {
            if let Some(material) = next.iter_mut().find(|m| m.id == line.material_id) {
                material.qty = (material.qty + line.qty * multiplier).max(0.0);
                affected.push(material.clone());
            }
        }
        self.store.put_json(KEY_INVENTORY, &next)?;
        *guard = next;
        Ok(affected)
    }

    async fn mirror_qty(&self, material: &RawMaterial) -> MirrorStatus {
        self.mirror
            .dispatch(
                MirrorOp::Update {
                    path: format!("{}/{}", self.remote_root, material.id),
                },
                serde_json::json!({"qty": material.qty}),
            )
            .await
    }
}

/// Failure modes of [`InventoryLedger::take_requirements`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TakeError {
    #[error(transparent)]
    Shortage(StockShortage),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<TakeError> for AppError {
    fn from(err: TakeError) -> Self {
        match err {
            TakeError::Shortage(shortage) => AppError::business_rule(shortage.to_string()),
            TakeError::Storage(message) => AppError::storage(message),
        }
    }
}

impl std::fmt::Debug for InventoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryLedger")
            .field("materials", &self.state.read().len())
            .finish()
    }
}
