//! Shared types for the Brasa POS
//!
//! Common types used by the server and its clients: domain models,
//! the kitchen order state machine, error types, sync message payloads
//! and id/time utilities.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Error re-exports (for convenient access)
pub use error::{ApiResponse, AppError, AppResult};

// Message bus re-exports
pub use message::{BusMessage, SyncPayload};
