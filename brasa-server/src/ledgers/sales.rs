//! Cart and sales ledger
//!
//! The in-progress cart plus two sale ledgers: the current-day list (purged
//! at day-close) and the all-time list (never purged). Confirmed sales are
//! immutable; committing one prepends it to both ledgers and clears the
//! cart in the same critical section.
//!
//! Sale confirmation as a whole (inventory deduction, kitchen orders) is
//! orchestrated by [`crate::checkout::Checkout`]; this ledger owns the
//! cart arithmetic and the record append.

use crate::remote::{Mirror, MirrorOp, MirrorStatus};
use crate::store::{KEY_CART, KEY_SALES_ALL_TIME, KEY_SALES_CURRENT, LedgerStore};
use crate::utils::money;
use crate::utils::time::DayRange;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{CartLine, HistoryEntry, ItemOptions, Product, SaleRecord, SoldLine};
use shared::util::{now_millis, snowflake_str};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SalesState {
    cart: Vec<CartLine>,
    current: Vec<SaleRecord>,
    all_time: Vec<SaleRecord>,
}

/// Cart and sale ledgers state container
pub struct SalesLedger {
    state: RwLock<SalesState>,
    store: Arc<LedgerStore>,
    mirror: Arc<Mirror>,
}

impl SalesLedger {
    /// Load cart and both ledgers from the embedded store
    pub fn load(store: Arc<LedgerStore>, mirror: Arc<Mirror>) -> AppResult<Self> {
        let state = SalesState {
            cart: store.get_json(KEY_CART)?.unwrap_or_default(),
            current: store.get_json(KEY_SALES_CURRENT)?.unwrap_or_default(),
            all_time: store.get_json(KEY_SALES_ALL_TIME)?.unwrap_or_default(),
        };
        Ok(Self {
            state: RwLock::new(state),
            store,
            mirror,
        })
    }

    // ========== Read views ==========

    pub fn cart(&self) -> Vec<CartLine> {
        self.state.read().cart.clone()
    }

    pub fn current(&self) -> Vec<SaleRecord> {
        self.state.read().current.clone()
    }

    pub fn all_time(&self) -> Vec<SaleRecord> {
        self.state.read().all_time.clone()
    }

    /// Current-view records inside the range
    pub fn sales_in(&self, range: DayRange) -> Vec<SaleRecord> {
        self.state
            .read()
            .current
            .iter()
            .filter(|s| range.contains(s.date))
            .cloned()
            .collect()
    }

    /// Sum of totals inside the range (decimal arithmetic)
    pub fn total_in(&self, range: DayRange) -> f64 {
        let sum = self
            .state
            .read()
            .current
            .iter()
            .filter(|s| range.contains(s.date))
            .fold(rust_decimal::Decimal::ZERO, |acc, s| {
                acc + money::to_decimal(s.total)
            });
        money::to_f64(sum)
    }

    // ========== Cart mutations ==========

    /// Add one unit of a product to the cart
    ///
    /// A line with the same `(product_id, options)` pair coalesces by
    /// incrementing `qty`; otherwise a new line with a fresh id is appended.
    pub fn add_to_cart(
        &self,
        product: &Product,
        unit_price: Option<f64>,
        options: ItemOptions,
    ) -> AppResult<CartLine> {
        let price = unit_price.unwrap_or(product.price);

        let mut guard = self.state.write();
        let mut next = guard.clone();

        let line = match next
            .cart
            .iter_mut()
            .find(|l| l.product_id == product.id && l.options == options)
        {
            Some(existing) => {
                existing.qty += 1;
                existing.clone()
            }
            None => {
                let line = CartLine {
                    line_id: snowflake_str(),
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price,
                    qty: 1,
                    options,
                };
                next.cart.push(line.clone());
                line
            }
        };

        self.store.put_json(KEY_CART, &next.cart)?;
        *guard = next;
        Ok(line)
    }

    /// Decrement a line; the line disappears when qty would reach zero
    ///
    /// Returns the updated line, or None when it was removed.
    pub fn decrease_line(&self, line_id: &str) -> AppResult<Option<CartLine>> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let pos = next
            .cart
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| AppError::not_found(format!("Cart line {line_id}")))?;

        let updated = if next.cart[pos].qty > 1 {
            next.cart[pos].qty -= 1;
            Some(next.cart[pos].clone())
        } else {
            next.cart.remove(pos);
            None
        };

        self.store.put_json(KEY_CART, &next.cart)?;
        *guard = next;
        Ok(updated)
    }

    /// Delete a line outright
    pub fn remove_line(&self, line_id: &str) -> AppResult<CartLine> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let pos = next
            .cart
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| AppError::not_found(format!("Cart line {line_id}")))?;
        let removed = next.cart.remove(pos);
        self.store.put_json(KEY_CART, &next.cart)?;
        *guard = next;
        Ok(removed)
    }

    /// Empty the cart
    pub fn clear_cart(&self) -> AppResult<()> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        next.cart.clear();
        self.store.put_json(KEY_CART, &next.cart)?;
        *guard = next;
        Ok(())
    }

    // ========== Sale commit ==========

    /// Lines a confirmation would sell: the override, or the cart snapshot
    pub fn pending_lines(&self, override_lines: Option<Vec<SoldLine>>) -> Vec<SoldLine> {
        match override_lines {
            Some(lines) => lines,
            None => self.state.read().cart.iter().map(SoldLine::from).collect(),
        }
    }

    /// Append a confirmed sale to both ledgers and clear the cart
    ///
    /// The record id, total and date are assigned here; the total is the
    /// decimal sum of `price * qty` over the lines.
    pub fn commit_sale(&self, lines: Vec<SoldLine>) -> AppResult<SaleRecord> {
        let record = SaleRecord {
            id: snowflake_str(),
            total: money::sale_total(&lines),
            products: lines,
            date: now_millis(),
        };

        let mut guard = self.state.write();
        let mut next = guard.clone();
        next.current.insert(0, record.clone());
        next.all_time.insert(0, record.clone());
        next.cart.clear();
        self.store.put_json(KEY_CART, &next.cart)?;
        self.store.put_json(KEY_SALES_CURRENT, &next.current)?;
        self.store.put_json(KEY_SALES_ALL_TIME, &next.all_time)?;
        *guard = next;
        Ok(record)
    }

    /// Undo a just-committed sale (checkout compensation only)
    pub(crate) fn rollback_sale(&self, sale_id: &str) -> AppResult<()> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        next.current.retain(|s| s.id != sale_id);
        next.all_time.retain(|s| s.id != sale_id);
        self.store.put_json(KEY_SALES_CURRENT, &next.current)?;
        self.store.put_json(KEY_SALES_ALL_TIME, &next.all_time)?;
        *guard = next;
        Ok(())
    }

    /// Mirror a committed sale to the remote ledger
    pub async fn mirror_sale(&self, record: &SaleRecord) -> MirrorStatus {
        // The remote feed tags records like the combined history does
        let payload = serde_json::to_value(HistoryEntry::Sale(record.clone())).unwrap_or_default();
        self.mirror
            .dispatch(
                MirrorOp::Push {
                    collection: "sales".to_string(),
                },
                payload,
            )
            .await
    }

    // ========== Day close ==========

    /// Purge the business day's records from the current view only
    ///
    /// The all-time ledger is untouched. Returns how many records left the
    /// current view.
    pub fn close_day(&self, range: DayRange) -> AppResult<usize> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let before = next.current.len();
        next.current.retain(|s| !range.contains(s.date));
        let purged = before - next.current.len();
        self.store.put_json(KEY_SALES_CURRENT, &next.current)?;
        *guard = next;
        Ok(purged)
    }
}

impl std::fmt::Debug for SalesLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SalesLedger")
            .field("cart_lines", &state.cart.len())
            .field("current", &state.current.len())
            .field("all_time", &state.all_time.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> SalesLedger {
        let store = Arc::new(LedgerStore::open_in_memory().unwrap());
        let mirror = Arc::new(Mirror::disabled(Arc::clone(&store)));
        SalesLedger::load(store, mirror).unwrap()
    }

    fn burger() -> Product {
        Product {
            id: "p1".into(),
            name: "Hamburguesa".into(),
            price: 14000.0,
            recipe: vec![],
        }
    }

    fn soda() -> Product {
        Product {
            id: "p3".into(),
            name: "Gaseosa".into(),
            price: 2000.0,
            recipe: vec![],
        }
    }

    fn with_sauce(sauce: &str) -> ItemOptions {
        let mut options = ItemOptions::default();
        options.sauces.insert(sauce.to_string());
        options
    }

    #[test]
    fn same_product_and_options_coalesce() {
        let ledger = ledger();
        let a = ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        let b = ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        assert_eq!(a.line_id, b.line_id);
        assert_eq!(b.qty, 2);
        assert_eq!(ledger.cart().len(), 1);
    }

    #[test]
    fn different_options_get_their_own_line() {
        let ledger = ledger();
        ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        ledger
            .add_to_cart(&burger(), None, with_sauce("bbq"))
            .unwrap();
        assert_eq!(ledger.cart().len(), 2);
    }

    #[test]
    fn decrease_removes_at_zero() {
        let ledger = ledger();
        let line = ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();

        let updated = ledger.decrease_line(&line.line_id).unwrap();
        assert_eq!(updated.unwrap().qty, 1);
        let removed = ledger.decrease_line(&line.line_id).unwrap();
        assert!(removed.is_none());
        assert!(ledger.cart().is_empty());

        assert!(matches!(
            ledger.decrease_line(&line.line_id),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn commit_computes_total_and_clears_cart() {
        let ledger = ledger();
        // (14000 * 2) + (2000 * 1) = 30000
        ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        ledger
            .add_to_cart(&soda(), None, ItemOptions::default())
            .unwrap();

        let lines = ledger.pending_lines(None);
        let record = ledger.commit_sale(lines).unwrap();
        assert_eq!(record.total, 30000.0);
        assert_eq!(record.products.len(), 2);
        assert!(ledger.cart().is_empty());
        assert_eq!(ledger.current().len(), 1);
        assert_eq!(ledger.all_time().len(), 1);
    }

    #[test]
    fn unit_price_override_is_kept() {
        let ledger = ledger();
        let line = ledger
            .add_to_cart(&burger(), Some(16000.0), with_sauce("bbq"))
            .unwrap();
        assert_eq!(line.price, 16000.0);
    }

    #[test]
    fn empty_cart_has_no_pending_lines() {
        let ledger = ledger();
        assert!(ledger.pending_lines(None).is_empty());
    }

    #[test]
    fn close_day_purges_current_view_only() {
        let ledger = ledger();
        // Three records: today / yesterday / today, via direct commit plus
        // a date rewrite on the middle one.
        for _ in 0..3 {
            ledger
                .add_to_cart(&soda(), None, ItemOptions::default())
                .unwrap();
            let lines = ledger.pending_lines(None);
            ledger.commit_sale(lines).unwrap();
        }
        let yesterday_id = {
            let mut guard = ledger.state.write();
            guard.current[1].date -= 24 * 3600 * 1000;
            let id = guard.current[1].id.clone();
            let idx = guard.all_time.iter().position(|s| s.id == id).unwrap();
            guard.all_time[idx].date -= 24 * 3600 * 1000;
            id
        };

        let now = now_millis();
        let range = DayRange {
            start: now - 3600 * 1000,
            end: now + 3600 * 1000,
        };
        let purged = ledger.close_day(range).unwrap();
        assert_eq!(purged, 2);

        let current = ledger.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, yesterday_id);
        assert_eq!(ledger.all_time().len(), 3);
    }

    #[test]
    fn rollback_removes_from_both_ledgers() {
        let ledger = ledger();
        ledger
            .add_to_cart(&soda(), None, ItemOptions::default())
            .unwrap();
        let record = ledger.commit_sale(ledger.pending_lines(None)).unwrap();
        ledger.rollback_sale(&record.id).unwrap();
        assert!(ledger.current().is_empty());
        assert!(ledger.all_time().is_empty());
    }

    #[test]
    fn state_survives_reload() {
        let store = Arc::new(LedgerStore::open_in_memory().unwrap());
        let mirror = Arc::new(Mirror::disabled(Arc::clone(&store)));
        let ledger = SalesLedger::load(Arc::clone(&store), Arc::clone(&mirror)).unwrap();
        ledger
            .add_to_cart(&burger(), None, ItemOptions::default())
            .unwrap();
        ledger.commit_sale(ledger.pending_lines(None)).unwrap();

        let reloaded = SalesLedger::load(store, mirror).unwrap();
        assert_eq!(reloaded.current().len(), 1);
        assert_eq!(reloaded.all_time().len(), 1);
        assert!(reloaded.cart().is_empty());
    }
}
