//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: table, menu, profile, role, salary system, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Usernames
pub const MAX_USERNAME_LEN: usize = 64;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LEN: usize = 4;

/// Largest single yen amount a salary system or sale may carry (1億円)
pub const MAX_YEN_AMOUNT: i64 = 100_000_000;

/// Rounding units accepted for slips and backs (yen)
pub const ROUNDING_UNITS: &[i64] = &[1, 10, 100, 1000, 10000];

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Validate a percentage in `0..=100`
pub fn validate_percentage(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate a non-negative amount
pub fn validate_non_negative(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!(
            "{field} cannot be negative: {value}"
        )));
    }
    Ok(())
}

/// Validate a yen amount in `0..=MAX_YEN_AMOUNT`
pub fn validate_amount(value: i64, field: &str) -> Result<(), AppError> {
    validate_non_negative(value, field)?;
    if value > MAX_YEN_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds the maximum of {MAX_YEN_AMOUNT}: {value}"
        )));
    }
    Ok(())
}

/// Validate a rounding unit against [`ROUNDING_UNITS`]
pub fn validate_rounding_unit(unit: i64, field: &str) -> Result<(), AppError> {
    if !ROUNDING_UNITS.contains(&unit) {
        return Err(AppError::with_message(
            shared::error::ErrorCode::InvalidRoundingUnit,
            format!("{field} must be one of {ROUNDING_UNITS:?}, got {unit}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("VIP 1", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"a".repeat(201), "name", MAX_NAME_LEN).is_err());
        // multi-byte names count characters, not bytes
        assert!(validate_required_text(&"あ".repeat(200), "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(0.0, "rate").is_ok());
        assert!(validate_percentage(100.0, "rate").is_ok());
        assert!(validate_percentage(-0.5, "rate").is_err());
        assert!(validate_percentage(100.1, "rate").is_err());
        assert!(validate_percentage(f64::NAN, "rate").is_err());
    }

    #[test]
    fn test_amount_bounds() {
        assert!(validate_amount(0, "amount").is_ok());
        assert!(validate_amount(MAX_YEN_AMOUNT, "amount").is_ok());
        assert!(validate_amount(-1, "amount").is_err());
        assert!(validate_amount(MAX_YEN_AMOUNT + 1, "amount").is_err());
        assert!(validate_amount(i64::MAX, "amount").is_err());
    }

    #[test]
    fn test_rounding_unit() {
        assert!(validate_rounding_unit(100, "unit").is_ok());
        let err = validate_rounding_unit(50, "unit").unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::InvalidRoundingUnit);
    }
}
