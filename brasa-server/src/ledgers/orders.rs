//! Kitchen order queue
//!
//! Orders derive from cart lines of confirmed sales, one order per line.
//! The cook advances each order along the forward-only chain
//! `Received -> Preparing -> Closed`; the transition function rejects
//! anything else with a typed error instead of accepting arbitrary status
//! writes.
//!
//! The queue also consumes the remote subscription feed: snapshots replace
//! local state only when their version is strictly newer than the last
//! accepted one, so a late-arriving stale snapshot cannot overwrite fresher
//! local edits.

use crate::remote::{Mirror, MirrorOp, MirrorStatus};
use crate::store::{KEY_ORDERS, LedgerStore};
use crate::utils::money;
use crate::utils::validation::{MAX_NAME_LEN, validate_qty, validate_required_text};
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::order::{KitchenOrder, OrderCreate, OrderStatus};
use shared::util::{now_millis, snowflake_str};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct QueueState {
    orders: Vec<KitchenOrder>,
    /// Version of the last accepted remote snapshot
    remote_version: u64,
}

/// Kitchen order state container
pub struct OrderQueue {
    state: RwLock<QueueState>,
    store: Arc<LedgerStore>,
    mirror: Arc<Mirror>,
    /// Stale remote snapshots dropped since startup
    stale_drops: AtomicU64,
}

impl OrderQueue {
    /// Load the queue from the embedded store
    pub fn load(store: Arc<LedgerStore>, mirror: Arc<Mirror>) -> AppResult<Self> {
        let orders: Vec<KitchenOrder> = store.get_json(KEY_ORDERS)?.unwrap_or_default();
        Ok(Self {
            state: RwLock::new(QueueState {
                orders,
                remote_version: 0,
            }),
            store,
            mirror,
            stale_drops: AtomicU64::new(0),
        })
    }

    // ========== Read views ==========

    pub fn all(&self) -> Vec<KitchenOrder> {
        self.state.read().orders.clone()
    }

    /// Orders the cook still has to handle
    pub fn active(&self) -> Vec<KitchenOrder> {
        self.state
            .read()
            .orders
            .iter()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect()
    }

    /// Handed-out orders
    pub fn closed(&self) -> Vec<KitchenOrder> {
        self.state
            .read()
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Closed)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<KitchenOrder> {
        self.state.read().orders.iter().find(|o| o.id == id).cloned()
    }

    /// Stale snapshots dropped since startup
    pub fn stale_drop_count(&self) -> u64 {
        self.stale_drops.load(Ordering::Relaxed)
    }

    // ========== Mutations ==========

    /// Create a kitchen order
    ///
    /// `amount` falls back to `qty * unit_price` when no override is given.
    /// Invalid input is a typed validation error, never a silent no-op.
    pub async fn create(&self, data: OrderCreate) -> AppResult<(KitchenOrder, MirrorStatus)> {
        validate_required_text(&data.product, "product", MAX_NAME_LEN)?;
        validate_qty(data.qty, "qty")?;

        let order = KitchenOrder {
            id: snowflake_str(),
            product: data.product,
            qty: data.qty,
            status: OrderStatus::Received,
            date: now_millis(),
            amount: data
                .amount
                .unwrap_or_else(|| money::line_total(data.unit_price, data.qty)),
        };

        {
            let mut guard = self.state.write();
            let mut next = guard.orders.clone();
            next.push(order.clone());
            self.store.put_json(KEY_ORDERS, &next)?;
            guard.orders = next;
        }

        let status = self
            .mirror
            .dispatch(
                MirrorOp::Set {
                    path: format!("orders/{}", order.id),
                },
                serde_json::to_value(&order).unwrap_or_default(),
            )
            .await;
        Ok((order, status))
    }

    /// Advance an order along the forward chain
    ///
    /// Rejects unknown ids and every transition that is not the single next
    /// step. The Closed transition refreshes `date` to the closing time.
    pub async fn advance(
        &self,
        id: &str,
        new_status: OrderStatus,
    ) -> AppResult<(KitchenOrder, MirrorStatus)> {
        let updated = {
            let mut guard = self.state.write();
            let mut next = guard.orders.clone();
            let order = next
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;

            order.status.validate_transition(new_status)?;
            order.status = new_status;
            if new_status == OrderStatus::Closed {
                order.date = now_millis();
            }
            let updated = order.clone();
            self.store.put_json(KEY_ORDERS, &next)?;
            guard.orders = next;
            updated
        };

        let status = self
            .mirror
            .dispatch(
                MirrorOp::Update {
                    path: format!("orders/{}", updated.id),
                },
                serde_json::json!({"status": updated.status, "date": updated.date}),
            )
            .await;
        Ok((updated, status))
    }

    /// Drop an order (checkout compensation only)
    pub(crate) fn remove(&self, id: &str) -> AppResult<()> {
        let mut guard = self.state.write();
        let mut next = guard.orders.clone();
        next.retain(|o| o.id != id);
        self.store.put_json(KEY_ORDERS, &next)?;
        guard.orders = next;
        Ok(())
    }

    // ========== Remote reconciliation ==========

    /// Apply a remote snapshot of the full order collection
    ///
    /// Accepted only when `version` is strictly newer than the last
    /// accepted snapshot; returns whether the snapshot was applied. Stale
    /// snapshots are dropped and counted, never merged.
    pub fn apply_remote_snapshot(
        &self,
        version: u64,
        orders: Vec<KitchenOrder>,
    ) -> AppResult<bool> {
        let mut guard = self.state.write();
        if version <= guard.remote_version {
            self.stale_drops.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                version,
                local_version = guard.remote_version,
                "Dropping stale remote order snapshot"
            );
            return Ok(false);
        }

        self.store.put_json(KEY_ORDERS, &orders)?;
        guard.orders = orders;
        guard.remote_version = version;
        Ok(true)
    }
}

impl std::fmt::Debug for OrderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("OrderQueue")
            .field("orders", &state.orders.len())
            .field("remote_version", &state.remote_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> OrderQueue {
        let store = Arc::new(LedgerStore::open_in_memory().unwrap());
        let mirror = Arc::new(Mirror::disabled(Arc::clone(&store)));
        OrderQueue::load(store, mirror).unwrap()
    }

    fn burger_order(qty: i32) -> OrderCreate {
        OrderCreate {
            product: "Hamburguesa".into(),
            qty,
            unit_price: 14000.0,
            amount: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_amount_to_qty_times_price() {
        let queue = queue();
        let (order, _) = queue.create(burger_order(2)).await.unwrap();
        assert_eq!(order.amount, 28000.0);
        assert_eq!(order.status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn create_honors_amount_override() {
        let queue = queue();
        let (order, _) = queue
            .create(OrderCreate {
                product: "Perro Caliente".into(),
                qty: 1,
                unit_price: 13000.0,
                amount: Some(9999.0),
            })
            .await
            .unwrap();
        assert_eq!(order.amount, 9999.0);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_not_swallowed() {
        let queue = queue();
        assert!(matches!(
            queue
                .create(OrderCreate {
                    product: "  ".into(),
                    qty: 1,
                    unit_price: 1.0,
                    amount: None,
                })
                .await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            queue.create(burger_order(0)).await,
            Err(AppError::Validation { .. })
        ));
        assert!(queue.all().is_empty());
    }

    #[tokio::test]
    async fn full_forward_chain_moves_between_views() {
        let queue = queue();
        let (order, _) = queue.create(burger_order(1)).await.unwrap();
        assert_eq!(queue.active().len(), 1);

        queue
            .advance(&order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(queue.active().len(), 1);
        assert!(queue.closed().is_empty());

        let (closed, _) = queue.advance(&order.id, OrderStatus::Closed).await.unwrap();
        assert!(queue.active().is_empty());
        assert_eq!(queue.closed().len(), 1);
        // Closing refreshed the date
        assert!(closed.date >= order.date);
    }

    #[tokio::test]
    async fn skip_and_rewind_are_rejected() {
        let queue = queue();
        let (order, _) = queue.create(burger_order(1)).await.unwrap();

        assert!(matches!(
            queue.advance(&order.id, OrderStatus::Closed).await,
            Err(AppError::InvalidTransition(_))
        ));

        queue
            .advance(&order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert!(matches!(
            queue.advance(&order.id, OrderStatus::Received).await,
            Err(AppError::InvalidTransition(_))
        ));

        // Still exactly where the last legal transition left it
        assert_eq!(queue.find(&order.id).unwrap().status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn advance_unknown_id_is_not_found() {
        let queue = queue();
        assert!(matches!(
            queue.advance("ghost", OrderStatus::Preparing).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn stale_snapshot_is_dropped_newer_is_applied() {
        let queue = queue();
        let (local, _) = queue.create(burger_order(1)).await.unwrap();

        let remote_order = KitchenOrder {
            id: "remote-1".into(),
            product: "Gaseosa".into(),
            qty: 1,
            status: OrderStatus::Received,
            date: now_millis(),
            amount: 2000.0,
        };

        assert!(
            queue
                .apply_remote_snapshot(3, vec![remote_order.clone()])
                .unwrap()
        );
        assert!(queue.find(&local.id).is_none());
        assert_eq!(queue.all().len(), 1);

        // Version 2 arrives late: dropped, state unchanged
        assert!(!queue.apply_remote_snapshot(2, vec![]).unwrap());
        assert_eq!(queue.all().len(), 1);
        assert_eq!(queue.stale_drop_count(), 1);

        // Version 4 wins
        assert!(queue.apply_remote_snapshot(4, vec![]).unwrap());
        assert!(queue.all().is_empty());
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let store = Arc::new(LedgerStore::open_in_memory().unwrap());
        let mirror = Arc::new(Mirror::disabled(Arc::clone(&store)));
        let queue = OrderQueue::load(Arc::clone(&store), Arc::clone(&mirror)).unwrap();
        queue.create(burger_order(1)).await.unwrap();

        let reloaded = OrderQueue::load(store, mirror).unwrap();
        assert_eq!(reloaded.all().len(), 1);
    }
}
