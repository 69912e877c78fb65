//! Sync bus message types
//!
//! Every state mutation on the server broadcasts a [`SyncPayload`] so that
//! connected terminals (admin dashboard, cook display) can refresh without
//! polling. Versions are monotonically increasing per resource; a client
//! holding version `n` discards any payload with `version <= n`.

use serde::{Deserialize, Serialize};

/// Resource sync notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncPayload {
    /// Resource type ("inventory", "product", "sale", "order", "expense", "cash")
    pub resource: String,
    /// Monotonic per-resource version
    pub version: u64,
    /// Change kind ("created", "updated", "deleted", "closed")
    pub action: String,
    /// Resource id
    pub id: String,
    /// Resource data (None for deletions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Message carried on the in-process broadcast bus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BusMessage {
    /// Resource changed
    Sync(SyncPayload),
}

impl BusMessage {
    /// Build a sync message from a payload
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::Sync(payload.clone())
    }
}
