//! Business state containers
//!
//! Each ledger owns one slice of POS state behind a `parking_lot` lock,
//! persists its full snapshot to the embedded store after every mutation,
//! and mirrors the mutation to the remote store through the outbox.
//!
//! Mutations follow one pattern: take the write lock, build the next
//! snapshot, persist it, then swap it in. A storage failure leaves the
//! in-memory state untouched, so memory and disk never diverge.
//!
//! # Containers
//!
//! - [`inventory`] - raw material quantities (库存)
//! - [`catalog`] - sellable products and recipes
//! - [`sales`] - cart plus current-day and all-time sale ledgers
//! - [`orders`] - kitchen order queue with forward-only status machine
//! - [`expenses`] - expense ledger with combined movement history
//! - [`cash`] - register session and day-close history (收银)

pub mod cash;
pub mod catalog;
pub mod expenses;
pub mod inventory;
pub mod orders;
pub mod sales;

pub use cash::CashRegister;
pub use catalog::ProductCatalog;
pub use expenses::ExpenseLedger;
pub use inventory::InventoryLedger;
pub use orders::OrderQueue;
pub use sales::SalesLedger;
