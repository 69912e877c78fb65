//! Remote mirror outbox
//!
//! Every local mutation that must reach the remote store goes through
//! [`Mirror::dispatch`]: one immediate delivery attempt, then — on failure —
//! a durable outbox entry. The caller always learns what happened via
//! [`MirrorStatus`]; nothing is silently dropped. A background task retries
//! queued entries with a bounded retry budget and moves permanent failures
//! to the dead letter queue, where they stay visible to the operator.

use super::{RemoteResult, RemoteStore};
use crate::store::LedgerStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Retry budget before an entry is buried in the dead letter queue
const MAX_RETRIES: u32 = 8;

/// Entries examined per flush pass
const FLUSH_BATCH: usize = 64;

/// Background flush cadence
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Remote mirror operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MirrorOp {
    /// Append under a generated key
    Push { collection: String },
    /// Full-value set
    Set { path: String },
    /// Partial-field update
    Update { path: String },
    /// Remove a child whose `id` field matches; the remote key is found by
    /// scanning the collection (remote keys are server-generated)
    DeleteByLogicalId {
        collection: String,
        logical_id: String,
    },
}

/// Durable outbox entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    #[serde(flatten)]
    pub op: MirrorOp,
    pub payload: Value,
    pub created_at: i64,
    pub retry_count: u32,
    pub last_error: Option<String>,
}

/// What happened to a mirror write, reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorStatus {
    /// Reached the remote store on the first attempt
    Delivered,
    /// Delivery failed; entry persisted to the outbox for retry
    Queued,
    /// Delivery failed and the outbox write failed too
    Failed,
    /// No remote store configured
    Disabled,
}

impl MirrorStatus {
    /// Combine two statuses, keeping the worse outcome
    ///
    /// Severity order: Failed > Queued > Disabled > Delivered.
    pub fn combine(self, other: MirrorStatus) -> MirrorStatus {
        use MirrorStatus::*;
        match (self, other) {
            (Failed, _) | (_, Failed) => Failed,
            (Queued, _) | (_, Queued) => Queued,
            (Disabled, _) | (_, Disabled) => Disabled,
            (Delivered, Delivered) => Delivered,
        }
    }
}

/// Flush pass statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    pub delivered: usize,
    pub retried: usize,
    pub buried: usize,
}

/// Local-to-remote mirror with durable outbox
pub struct Mirror {
    remote: Option<Arc<dyn RemoteStore>>,
    store: Arc<LedgerStore>,
}

impl Mirror {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, store: Arc<LedgerStore>) -> Self {
        Self { remote, store }
    }

    /// Mirror with no remote configured; every dispatch reports `Disabled`
    pub fn disabled(store: Arc<LedgerStore>) -> Self {
        Self {
            remote: None,
            store,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Attempt delivery now; queue on failure
    pub async fn dispatch(&self, op: MirrorOp, payload: Value) -> MirrorStatus {
        let Some(remote) = &self.remote else {
            return MirrorStatus::Disabled;
        };

        match Self::send(remote.as_ref(), &op, &payload).await {
            Ok(()) => MirrorStatus::Delivered,
            Err(err) => {
                tracing::warn!(op = ?op, error = %err, "Remote mirror write failed, queueing");
                let entry = OutboxEntry {
                    op,
                    payload,
                    created_at: shared::util::now_millis(),
                    retry_count: 0,
                    last_error: Some(err.to_string()),
                };
                match self.store.outbox_append(&entry) {
                    Ok(_) => MirrorStatus::Queued,
                    Err(store_err) => {
                        tracing::error!(error = %store_err, "Failed to queue mirror write");
                        MirrorStatus::Failed
                    }
                }
            }
        }
    }

    async fn send(remote: &dyn RemoteStore, op: &MirrorOp, payload: &Value) -> RemoteResult<()> {
        match op {
            MirrorOp::Push { collection } => {
                remote.push(collection, payload).await?;
                Ok(())
            }
            MirrorOp::Set { path } => remote.set(path, payload).await,
            MirrorOp::Update { path } => remote.update(path, payload).await,
            MirrorOp::DeleteByLogicalId {
                collection,
                logical_id,
            } => {
                let Some(Value::Object(children)) = remote.get(collection).await? else {
                    // Nothing mirrored under this collection; done
                    return Ok(());
                };
                let matching = children.iter().find(|(_, child)| {
                    child.get("id").and_then(Value::as_str) == Some(logical_id.as_str())
                });
                match matching {
                    Some((key, _)) => remote.delete(&format!("{collection}/{key}")).await,
                    None => {
                        tracing::debug!(
                            collection,
                            logical_id,
                            "Logical id not found on remote, nothing to delete"
                        );
                        Ok(())
                    }
                }
            }
        }
    }

    /// Drain one batch of queued entries
    pub async fn flush_once(&self) -> FlushStats {
        let mut stats = FlushStats::default();
        let Some(remote) = &self.remote else {
            return stats;
        };

        let pending: Vec<(u64, OutboxEntry)> = match self.store.outbox_pending(FLUSH_BATCH) {
            Ok(p) => p,
            Err(err) => {
                tracing::error!(error = %err, "Failed to read outbox");
                return stats;
            }
        };

        for (id, mut entry) in pending {
            match Self::send(remote.as_ref(), &entry.op, &entry.payload).await {
                Ok(()) => {
                    if let Err(err) = self.store.outbox_remove(id) {
                        tracing::error!(id, error = %err, "Failed to remove delivered outbox entry");
                    } else {
                        stats.delivered += 1;
                    }
                }
                Err(err) => {
                    entry.retry_count += 1;
                    entry.last_error = Some(err.to_string());
                    if entry.retry_count >= MAX_RETRIES {
                        tracing::error!(
                            id,
                            retries = entry.retry_count,
                            error = %err,
                            "Mirror write exhausted retries, moving to dead letter"
                        );
                        if self.store.outbox_bury(id, &entry).is_ok() {
                            stats.buried += 1;
                        }
                    } else {
                        if let Err(store_err) = self.store.outbox_update(id, &entry) {
                            tracing::error!(id, error = %store_err, "Failed to update outbox entry");
                        }
                        stats.retried += 1;
                    }
                }
            }
        }
        stats
    }

    /// Number of queued entries
    pub fn pending(&self) -> u64 {
        self.store.outbox_len().unwrap_or(0)
    }

    /// Spawn the background flush loop
    pub fn spawn_flush_loop(self: &Arc<Self>) {
        let mirror = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FLUSH_INTERVAL);
            // First tick fires immediately; skip it so startup stays quiet
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let stats = mirror.flush_once().await;
                if stats.delivered + stats.retried + stats.buried > 0 {
                    tracing::debug!(
                        delivered = stats.delivered,
                        retried = stats.retried,
                        buried = stats.buried,
                        "Outbox flush pass"
                    );
                }
            }
        });
    }
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
