//! Remote real-time store client
//!
//! The shared backend is a tree-structured key-value store addressed by
//! slash-separated paths (`orders`, `sales`, `expenses`,
//! `inventories/{store_key}`). The transport lives behind [`RemoteStore`]:
//! [`http::HttpRemote`] talks to the real backend, [`MemoryRemote`] backs
//! tests. All local writes reach the remote through the
//! [`outbox::Mirror`], never directly.

pub mod http;
pub mod outbox;

pub use http::HttpRemote;
pub use outbox::{Mirror, MirrorOp, MirrorStatus, OutboxEntry};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Remote store errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store returned status {0}")]
    Status(u16),

    #[error("Malformed remote response: {0}")]
    Decode(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Tree-structured remote key-value store
///
/// Paths are slash-separated, keys generated by `push` are returned to the
/// caller. `get` on an interior path returns an object keyed by child id.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Append under a generated key, returns the key
    async fn push(&self, path: &str, value: &Value) -> RemoteResult<String>;
    /// Full-value set at the path
    async fn set(&self, path: &str, value: &Value) -> RemoteResult<()>;
    /// Partial-field update at the path
    async fn update(&self, path: &str, value: &Value) -> RemoteResult<()>;
    /// One-shot read; None when the path holds nothing
    async fn get(&self, path: &str) -> RemoteResult<Option<Value>>;
    /// Remove the path and everything under it
    async fn delete(&self, path: &str) -> RemoteResult<()>;
}

/// In-memory remote store for tests
///
/// Stores leaf paths in a flat map and reassembles subtrees on read. The
/// `fail` switch simulates an unreachable backend.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    entries: parking_lot::Mutex<BTreeMap<String, Value>>,
    fail: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (simulated outage)
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Direct leaf read, bypassing the trait (test assertions)
    pub fn leaf(&self, path: &str) -> Option<Value> {
        self.entries.lock().get(path).cloned()
    }

    /// Number of stored leaves (test assertions)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_up(&self) -> RemoteResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RemoteError::Transport("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Insert a leaf into a nested JSON object along `segments`
fn insert_nested(target: &mut serde_json::Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [leaf] => {
            target.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(map) = child {
                insert_nested(map, rest, value);
            }
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn push(&self, path: &str, value: &Value) -> RemoteResult<String> {
        self.check_up()?;
        let key = shared::util::snowflake_str();
        self.entries
            .lock()
            .insert(format!("{path}/{key}"), value.clone());
        Ok(key)
    }

    async fn set(&self, path: &str, value: &Value) -> RemoteResult<()> {
        self.check_up()?;
        self.entries.lock().insert(path.to_string(), value.clone());
        Ok(())
    }

    async fn update(&self, path: &str, value: &Value) -> RemoteResult<()> {
        self.check_up()?;
        let mut entries = self.entries.lock();
        match (entries.get_mut(path), value) {
            (Some(Value::Object(existing)), Value::Object(fields)) => {
                for (k, v) in fields {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                entries.insert(path.to_string(), value.clone());
            }
        }
        Ok(())
    }

    async fn get(&self, path: &str) -> RemoteResult<Option<Value>> {
        self.check_up()?;
        let entries = self.entries.lock();
        if let Some(leaf) = entries.get(path) {
            return Ok(Some(leaf.clone()));
        }

        let prefix = format!("{path}/");
        let mut subtree = serde_json::Map::new();
        for (key, value) in entries.range(prefix.clone()..) {
            let Some(remainder) = key.strip_prefix(&prefix) else {
                break;
            };
            let segments: Vec<&str> = remainder.split('/').collect();
            insert_nested(&mut subtree, &segments, value.clone());
        }

        if subtree.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(subtree)))
        }
    }

    async fn delete(&self, path: &str) -> RemoteResult<()> {
        self.check_up()?;
        let mut entries = self.entries.lock();
        entries.remove(path);
        let prefix = format!("{path}/");
        entries.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}
