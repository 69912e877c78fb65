//! Sale confirmation
//!
//! Confirming a sale touches three containers in a fixed order:
//!
//! 1. inventory - aggregated recipe requirements are checked and deducted
//!    in one critical section
//! 2. sales - the record is appended to the current and all-time ledgers
//!    and the cart is cleared
//! 3. orders - one kitchen order per sold line
//!
//! A failure after step 1 unwinds what already happened: created orders are
//! dropped, the sale record is removed, and the deducted materials are
//! returned. Either the whole confirmation lands or none of it does; the
//! only survivor of a successful confirmation is its remote mirror status,
//! which reports (never hides) a backend that could not be reached.

use crate::ledgers::{ExpenseLedger, InventoryLedger, OrderQueue, ProductCatalog, SalesLedger};
use crate::remote::MirrorStatus;
use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::order::{KitchenOrder, OrderCreate};
use shared::models::{SaleRecord, SoldLine};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of a confirmed sale
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub sale: SaleRecord,
    pub orders: Vec<KitchenOrder>,
    /// Worst remote mirror outcome across all writes of this confirmation
    pub mirror: MirrorStatus,
}

/// Sale confirmation orchestrator
///
/// Owns nothing; every container is injected explicitly.
pub struct Checkout {
    inventory: Arc<InventoryLedger>,
    catalog: Arc<ProductCatalog>,
    sales: Arc<SalesLedger>,
    orders: Arc<OrderQueue>,
    expenses: Arc<ExpenseLedger>,
}

impl Checkout {
    pub fn new(
        inventory: Arc<InventoryLedger>,
        catalog: Arc<ProductCatalog>,
        sales: Arc<SalesLedger>,
        orders: Arc<OrderQueue>,
        expenses: Arc<ExpenseLedger>,
    ) -> Self {
        Self {
            inventory,
            catalog,
            sales,
            orders,
            expenses,
        }
    }

    /// Confirm the cart (or the given override lines) as a sale
    ///
    /// Returns `Ok(None)` when there is nothing to sell - confirming an
    /// empty cart any number of times stays a no-op.
    pub async fn confirm_sale(
        &self,
        override_lines: Option<Vec<SoldLine>>,
    ) -> AppResult<Option<CheckoutReceipt>> {
        let lines = self.sales.pending_lines(override_lines);
        if lines.is_empty() {
            return Ok(None);
        }

        // 1. Inventory: aggregate requirements over all lines, then check
        //    and deduct in one critical section.
        let requirements = self.aggregate_requirements(&lines);
        let taken = self
            .inventory
            .take_requirements(&requirements)
            .map_err(AppError::from)?;

        // 2. Sales ledger: append the record, clear the cart.
        let sale = match self.sales.commit_sale(lines.clone()) {
            Ok(sale) => sale,
            Err(err) => {
                self.give_back(&requirements);
                return Err(err);
            }
        };

        // 3. Kitchen orders: one per sold line.
        let mut orders = Vec::with_capacity(lines.len());
        let mut mirror = MirrorStatus::Delivered;
        for line in &lines {
            let created = self
                .orders
                .create(OrderCreate {
                    product: line.name.clone(),
                    qty: line.qty,
                    unit_price: line.price,
                    amount: None,
                })
                .await;
            match created {
                Ok((order, status)) => {
                    mirror = mirror.combine(status);
                    orders.push(order);
                }
                Err(err) => {
                    self.unwind(&sale, &orders, &requirements);
                    return Err(err);
                }
            }
        }

        // Combined movement history; a failure here leaves the feed one
        // entry short but does not unwind a completed sale.
        if let Err(err) = self.expenses.record_sale_entry(&sale) {
            tracing::warn!(sale_id = %sale.id, error = %err, "Failed to append sale to movement history");
        }

        // Remote mirror: consumed stock and the sale record itself.
        mirror = mirror.combine(self.inventory.mirror_all(&taken).await);
        mirror = mirror.combine(self.sales.mirror_sale(&sale).await);

        tracing::info!(
            sale_id = %sale.id,
            total = sale.total,
            lines = lines.len(),
            mirror = ?mirror,
            "Sale confirmed"
        );

        Ok(Some(CheckoutReceipt {
            sale,
            orders,
            mirror,
        }))
    }

    /// Total required quantity per material over all sold lines
    ///
    /// Lines whose product no longer exists in the catalog have no recipe
    /// and therefore no inventory impact.
    fn aggregate_requirements(&self, lines: &[SoldLine]) -> Vec<(String, f64)> {
        let mut requirements: BTreeMap<String, f64> = BTreeMap::new();
        for line in lines {
            let Some(product) = self.catalog.find(&line.product_id) else {
                tracing::debug!(
                    product_id = %line.product_id,
                    "Sold line references no catalog product, skipping recipe"
                );
                continue;
            };
            for recipe_line in &product.recipe {
                *requirements.entry(recipe_line.material_id.clone()).or_default() +=
                    recipe_line.qty * f64::from(line.qty);
            }
        }
        requirements.into_iter().collect()
    }

    fn give_back(&self, requirements: &[(String, f64)]) {
        if let Err(err) = self.inventory.give_back_requirements(requirements) {
            tracing::error!(error = %err, "Failed to return consumed materials during unwind");
        }
    }

    /// Unwind a partially confirmed sale: orders, record, then materials
    fn unwind(&self, sale: &SaleRecord, orders: &[KitchenOrder], requirements: &[(String, f64)]) {
        for order in orders {
            if let Err(err) = self.orders.remove(&order.id) {
                tracing::error!(order_id = %order.id, error = %err, "Failed to drop order during unwind");
            }
        }
        if let Err(err) = self.sales.rollback_sale(&sale.id) {
            tracing::error!(sale_id = %sale.id, error = %err, "Failed to remove sale during unwind");
        }
        self.give_back(requirements);
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryRemote, Mirror, RemoteStore};
    use crate::store::LedgerStore;
    use shared::models::{ItemOptions, MaterialCreate, ProductCreate, RecipeLine};

    struct Fixture {
        checkout: Checkout,
        inventory: Arc<InventoryLedger>,
        catalog: Arc<ProductCatalog>,
        sales: Arc<SalesLedger>,
        orders: Arc<OrderQueue>,
        expenses: Arc<ExpenseLedger>,
        remote: Arc<MemoryRemote>,
        mirror: Arc<Mirror>,
        bread: String,
        meat: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(LedgerStore::open_in_memory().unwrap());
        let remote = Arc::new(MemoryRemote::new());
        let mirror = Arc::new(Mirror::new(
            Some(Arc::clone(&remote) as Arc<dyn RemoteStore>),
            Arc::clone(&store),
        ));

        let inventory = Arc::new(
            InventoryLedger::load(Arc::clone(&store), Arc::clone(&mirror), "stand_1").unwrap(),
        );
        let catalog = Arc::new(ProductCatalog::load(Arc::clone(&store)).unwrap());
        let sales = Arc::new(SalesLedger::load(Arc::clone(&store), Arc::clone(&mirror)).unwrap());
        let orders = Arc::new(OrderQueue::load(Arc::clone(&store), Arc::clone(&mirror)).unwrap());
        let expenses =
            Arc::new(ExpenseLedger::load(Arc::clone(&store), Arc::clone(&mirror)).unwrap());

        let (bread, _) = inventory
            .add_material(MaterialCreate {
                name: "Pan".into(),
                qty: 10.0,
            })
            .await
            .unwrap();
        let (meat, _) = inventory
            .add_material(MaterialCreate {
                name: "Carne".into(),
                qty: 10.0,
            })
            .await
            .unwrap();

        let checkout = Checkout::new(
            Arc::clone(&inventory),
            Arc::clone(&catalog),
            Arc::clone(&sales),
            Arc::clone(&orders),
            Arc::clone(&expenses),
        );

        Fixture {
            checkout,
            inventory,
            catalog,
            sales,
            orders,
            expenses,
            remote,
            mirror,
            bread: bread.id,
            meat: meat.id,
        }
    }

    fn burger(fx: &Fixture) -> shared::models::Product {
        fx.catalog
            .add(ProductCreate {
                name: "Hamburguesa".into(),
                price: 14000.0,
                recipe: Some(vec![
                    RecipeLine {
                        material_id: fx.bread.clone(),
                        qty: 1.0,
                    },
                    RecipeLine {
                        material_id: fx.meat.clone(),
                        qty: 2.0,
                    },
                ]),
            })
            .unwrap()
    }

    fn soda(fx: &Fixture) -> shared::models::Product {
        fx.catalog
            .add(ProductCreate {
                name: "Gaseosa".into(),
                price: 2000.0,
                recipe: None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn empty_cart_confirms_to_none_repeatedly() {
        let fx = fixture().await;
        assert!(fx.checkout.confirm_sale(None).await.unwrap().is_none());
        assert!(fx.checkout.confirm_sale(None).await.unwrap().is_none());
        assert!(fx.sales.current().is_empty());
    }

    #[tokio::test]
    async fn confirm_deducts_stock_and_creates_one_order_per_line() {
        let fx = fixture().await;
        let burger = burger(&fx);
        let soda = soda(&fx);

        // Two burgers coalesce into one line, plus one soda line
        fx.sales
            .add_to_cart(&burger, None, ItemOptions::default())
            .unwrap();
        fx.sales
            .add_to_cart(&burger, None, ItemOptions::default())
            .unwrap();
        fx.sales
            .add_to_cart(&soda, None, ItemOptions::default())
            .unwrap();

        let receipt = fx.checkout.confirm_sale(None).await.unwrap().unwrap();

        // (14000 * 2) + (2000 * 1) = 30000
        assert_eq!(receipt.sale.total, 30000.0);
        // Order count == distinct cart lines, not units
        assert_eq!(receipt.orders.len(), 2);
        assert_eq!(fx.orders.active().len(), 2);
        // Recipe applied twice: bread 10-2, meat 10-4
        assert_eq!(fx.inventory.find(&fx.bread).unwrap().qty, 8.0);
        assert_eq!(fx.inventory.find(&fx.meat).unwrap().qty, 6.0);
        // Cart cleared; second confirm is a no-op
        assert!(fx.sales.cart().is_empty());
        assert!(fx.checkout.confirm_sale(None).await.unwrap().is_none());
        // Movement history picked up the sale
        assert_eq!(fx.expenses.history().len(), 1);
        // Everything mirrored
        assert_eq!(receipt.mirror, MirrorStatus::Delivered);
    }

    #[tokio::test]
    async fn shortage_rejects_and_leaves_everything_untouched() {
        let fx = fixture().await;
        let burger = burger(&fx);

        // 6 burgers want 12 meat, only 10 available
        for _ in 0..6 {
            fx.sales
                .add_to_cart(&burger, None, ItemOptions::default())
                .unwrap();
        }

        let err = fx.checkout.confirm_sale(None).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule { .. }));

        assert_eq!(fx.inventory.find(&fx.meat).unwrap().qty, 10.0);
        assert!(fx.sales.current().is_empty());
        assert!(fx.orders.all().is_empty());
        // Cart kept so the operator can fix it
        assert_eq!(fx.sales.cart().len(), 1);
    }

    #[tokio::test]
    async fn override_lines_sell_without_cart() {
        let fx = fixture().await;
        let burger = burger(&fx);

        let receipt = fx
            .checkout
            .confirm_sale(Some(vec![SoldLine {
                product_id: burger.id.clone(),
                name: burger.name.clone(),
                price: burger.price,
                qty: 3,
                options: ItemOptions::default(),
            }]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(receipt.sale.total, 42000.0);
        assert_eq!(receipt.orders.len(), 1);
        assert_eq!(fx.inventory.find(&fx.bread).unwrap().qty, 7.0);
        assert_eq!(fx.inventory.find(&fx.meat).unwrap().qty, 4.0);
    }

    #[tokio::test]
    async fn unknown_product_line_has_no_inventory_impact() {
        let fx = fixture().await;
        let receipt = fx
            .checkout
            .confirm_sale(Some(vec![SoldLine {
                product_id: "off-menu".into(),
                name: "Especial".into(),
                price: 5000.0,
                qty: 1,
                options: ItemOptions::default(),
            }]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(receipt.sale.total, 5000.0);
        assert_eq!(fx.inventory.find(&fx.bread).unwrap().qty, 10.0);
    }

    #[tokio::test]
    async fn remote_outage_queues_and_later_flush_drains() {
        let fx = fixture().await;
        let soda = soda(&fx);
        fx.sales
            .add_to_cart(&soda, None, ItemOptions::default())
            .unwrap();

        fx.remote.set_failing(true);
        let receipt = fx.checkout.confirm_sale(None).await.unwrap().unwrap();
        assert_eq!(receipt.mirror, MirrorStatus::Queued);
        assert!(fx.mirror.pending() > 0);
        // Local state is still the source of truth
        assert_eq!(fx.sales.current().len(), 1);

        fx.remote.set_failing(false);
        let stats = fx.mirror.flush_once().await;
        assert!(stats.delivered > 0);
        assert_eq!(fx.mirror.pending(), 0);
    }
}
