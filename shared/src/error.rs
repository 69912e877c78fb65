//! Unified error system for the Brasa POS
//!
//! Provides the application error type shared by every layer:
//! - [`AppError`]: rich error type with codes and human-readable messages
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors (validation, not found, conflict, business rule)
//! - 4xxx: Order errors
//! - 9xxx: System errors (storage, internal)
//!
//! # Example
//!
//! ```
//! use shared::error::AppError;
//!
//! let err = AppError::validation("amount must be non-negative");
//! assert_eq!(err.code(), "E0002");
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified application error
///
/// # Error classification
///
/// | Variant | HTTP | Meaning |
/// |---------|------|---------|
/// | Validation | 400 | Malformed or out-of-range input |
/// | NotFound | 404 | Resource does not exist |
/// | Conflict | 409 | Resource already exists / duplicate state |
/// | BusinessRule | 422 | Operation rejected by a domain rule |
/// | InvalidTransition | 422 | Kitchen order state machine rejection |
/// | Storage | 500 | Embedded store failure |
/// | Internal | 500 | Everything else |
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error (400)
    #[error("{message}")]
    Validation { message: String },

    /// Resource not found (404)
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Resource already exists (409)
    #[error("{resource} already exists")]
    Conflict { resource: String },

    /// Business rule violation (422)
    #[error("{message}")]
    BusinessRule { message: String },

    /// Illegal kitchen order status transition (422)
    #[error(transparent)]
    InvalidTransition(#[from] crate::order::TransitionError),

    /// Embedded storage error (500)
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Internal server error (500)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    // ========== Convenient constructors ==========

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a Conflict error
    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
        }
    }

    /// Create a BusinessRule error
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // ========== Error inspection ==========

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BusinessRule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E0002",
            Self::NotFound { .. } => "E0003",
            Self::Conflict { .. } => "E0004",
            Self::BusinessRule { .. } => "E0005",
            Self::InvalidTransition(_) => "E4001",
            Self::Storage { .. } => "E9002",
            Self::Internal { .. } => "E9001",
        }
    }
}

/// Unified API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    /// Message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response
    pub fn success(data: T) -> Self {
        Self {
            code: "E0000".to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::<()>::error(self.code(), self.to_string());

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;
