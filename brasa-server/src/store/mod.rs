//! redb-based embedded storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `ledgers` | ledger key | JSON blob | One snapshot per ledger view |
//! | `outbox` | entry id | JSON `OutboxEntry` | Pending remote mirror writes |
//! | `dead_letter` | entry id | JSON `OutboxEntry` | Permanently failed mirror writes |
//! | `sequence_counter` | name | `u64` | Outbox entry ids, resource versions |
//!
//! Each ledger persists its full in-memory snapshot under a single key after
//! every mutation; containers load their snapshot once at startup. The value
//! is the serde_json encoding of the ledger state.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: a commit is persistent as soon
//! as `commit()` returns, and copy-on-write with atomic pointer swap keeps
//! the file consistent across power loss. This matters on counter hardware
//! that gets unplugged at closing time.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Ledger snapshots: key = ledger name, value = JSON blob
const LEDGERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("ledgers");

/// Remote mirror outbox: key = entry id, value = JSON-serialized OutboxEntry
const OUTBOX_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("outbox");

/// Dead letter queue: key = entry id, value = JSON-serialized OutboxEntry
const DEAD_LETTER_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("dead_letter");

/// Counters: outbox sequence
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const OUTBOX_SEQ_KEY: &str = "outbox_seq";

// ── Ledger keys ─────────────────────────────────────────────────────

pub const KEY_INVENTORY: &str = "inventory";
pub const KEY_PRODUCTS: &str = "products";
pub const KEY_CART: &str = "cart";
pub const KEY_SALES_CURRENT: &str = "sales_current";
pub const KEY_SALES_ALL_TIME: &str = "sales_all_time";
pub const KEY_ORDERS: &str = "orders";
pub const KEY_EXPENSES_TODAY: &str = "expenses_today";
pub const KEY_EXPENSES_ALL_TIME: &str = "expenses_all_time";
pub const KEY_EXPENSES_HISTORY: &str = "expenses_history";
pub const KEY_CASH_SESSION: &str = "cash_session";
pub const KEY_CASH_HISTORY: &str = "cash_history";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for shared::error::AppError {
    fn from(err: StoreError) -> Self {
        shared::error::AppError::storage(err.to_string())
    }
}

/// Embedded key -> JSON store backed by redb
#[derive(Clone)]
pub struct LedgerStore {
    db: Arc<Database>,
}

impl LedgerStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(LEDGERS_TABLE)?;
            let _ = write_txn.open_table(OUTBOX_TABLE)?;
            let _ = write_txn.open_table(DEAD_LETTER_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(OUTBOX_SEQ_KEY)?.is_none() {
                seq_table.insert(OUTBOX_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Ledger snapshots ==========

    /// Load a ledger snapshot, None when the key was never written
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGERS_TABLE)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Persist a ledger snapshot, replacing any previous value
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LEDGERS_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Outbox ==========

    /// Append an entry to the outbox, returns its id
    pub fn outbox_append<T: Serialize>(&self, entry: &T) -> StoreResult<u64> {
        let bytes = serde_json::to_vec(entry)?;
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            let current = seq_table
                .get(OUTBOX_SEQ_KEY)?
                .map(|g| g.value())
                .unwrap_or(0);
            let next = current + 1;
            seq_table.insert(OUTBOX_SEQ_KEY, next)?;
            drop(seq_table);

            let mut table = write_txn.open_table(OUTBOX_TABLE)?;
            table.insert(next, bytes.as_slice())?;
            next
        };
        write_txn.commit()?;
        Ok(id)
    }

    /// Pending outbox entries in append order, up to `limit`
    pub fn outbox_pending<T: DeserializeOwned>(&self, limit: usize) -> StoreResult<Vec<(u64, T)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OUTBOX_TABLE)?;
        let mut entries = Vec::new();
        for item in table.iter()?.take(limit) {
            let (key, value) = item?;
            entries.push((key.value(), serde_json::from_slice(value.value())?));
        }
        Ok(entries)
    }

    /// Replace an outbox entry (retry bookkeeping)
    pub fn outbox_update<T: Serialize>(&self, id: u64, entry: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(entry)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(OUTBOX_TABLE)?;
            table.insert(id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove a delivered outbox entry
    pub fn outbox_remove(&self, id: u64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(OUTBOX_TABLE)?;
            table.remove(id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Number of pending outbox entries
    pub fn outbox_len(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OUTBOX_TABLE)?;
        let mut count = 0u64;
        for item in table.iter()? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Move a permanently failed entry to the dead letter queue
    pub fn outbox_bury<T: Serialize>(&self, id: u64, entry: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(entry)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut outbox = write_txn.open_table(OUTBOX_TABLE)?;
            outbox.remove(id)?;
            let mut dead = write_txn.open_table(DEAD_LETTER_TABLE)?;
            dead.insert(id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Dead letter entries, for operator inspection
    pub fn dead_letters<T: DeserializeOwned>(&self) -> StoreResult<Vec<(u64, T)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEAD_LETTER_TABLE)?;
        let mut entries = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            entries.push((key.value(), serde_json::from_slice(value.value())?));
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_snapshot_round_trip() {
        let store = LedgerStore::open_in_memory().unwrap();
        assert!(store.get_json::<Vec<String>>(KEY_INVENTORY).unwrap().is_none());

        let snapshot = vec!["pan".to_string(), "carne".to_string()];
        store.put_json(KEY_INVENTORY, &snapshot).unwrap();
        let loaded: Vec<String> = store.get_json(KEY_INVENTORY).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn outbox_append_order_and_remove() {
        let store = LedgerStore::open_in_memory().unwrap();
        let a = store.outbox_append(&serde_json::json!({"op": "a"})).unwrap();
        let b = store.outbox_append(&serde_json::json!({"op": "b"})).unwrap();
        assert!(b > a);

        let pending: Vec<(u64, serde_json::Value)> = store.outbox_pending(10).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].0, a);

        store.outbox_remove(a).unwrap();
        assert_eq!(store.outbox_len().unwrap(), 1);
    }

    #[test]
    fn bury_moves_entry_to_dead_letter() {
        let store = LedgerStore::open_in_memory().unwrap();
        let id = store.outbox_append(&serde_json::json!({"op": "x"})).unwrap();
        store.outbox_bury(id, &serde_json::json!({"op": "x", "failed": true})).unwrap();

        assert_eq!(store.outbox_len().unwrap(), 0);
        let dead: Vec<(u64, serde_json::Value)> = store.dead_letters().unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].0, id);
    }
}
