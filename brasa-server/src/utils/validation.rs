//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Limits are
//! chosen for reasonable UX on names and descriptions; the embedded store
//! has no built-in length enforcement.

use shared::error::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: material, product
pub const MAX_NAME_LEN: usize = 200;

/// Expense descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Option strings (sauces, extras)
pub const MAX_OPTION_LEN: usize = 100;

// ── Numeric limits ──────────────────────────────────────────────────

/// Maximum allowed unit price / amount
pub const MAX_AMOUNT: f64 = 100_000_000.0;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite, non-negative and within range.
pub fn validate_amount(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a line quantity.
pub fn validate_qty(value: i32, field: &str) -> AppResult<()> {
    if value < 1 {
        return Err(AppError::validation(format!(
            "{field} must be at least 1, got {value}"
        )));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_QUANTITY}), got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Pan", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn amount_rejects_nan_negative_and_huge() {
        assert!(validate_amount(f64::NAN, "amount").is_err());
        assert!(validate_amount(-1.0, "amount").is_err());
        assert!(validate_amount(MAX_AMOUNT * 2.0, "amount").is_err());
        assert!(validate_amount(14000.0, "amount").is_ok());
        assert!(validate_amount(0.0, "amount").is_ok());
    }

    #[test]
    fn qty_bounds() {
        assert!(validate_qty(0, "qty").is_err());
        assert!(validate_qty(1, "qty").is_ok());
        assert!(validate_qty(MAX_QUANTITY + 1, "qty").is_err());
    }
}
