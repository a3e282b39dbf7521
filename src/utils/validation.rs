//! Validation and parsing utilities for the API boundary

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;

use crate::types::*;

/// Date format used by the inherited REST contract (day-month-year)
pub const STATEMENT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a UI-entered closing balance into signed cents.
///
/// Amounts are entered as decimal strings with at most two decimal places;
/// anything that would produce fractional cents is a validation error.
pub fn parse_closing_balance(input: &str) -> ReconcileResult<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReconcileError::Validation(
            "Closing balance cannot be empty".to_string(),
        ));
    }

    let amount = BigDecimal::from_str(trimmed).map_err(|_| {
        ReconcileError::Validation(format!("'{}' is not a valid amount", trimmed))
    })?;

    let cents = amount * BigDecimal::from(100);
    if !cents.is_integer() {
        return Err(ReconcileError::Validation(
            "Closing balance must have at most two decimal places".to_string(),
        ));
    }

    cents.to_i64().ok_or_else(|| {
        ReconcileError::Validation(format!("'{}' is out of range", trimmed))
    })
}

/// Parse a statement date in the inherited day-month-year format
pub fn parse_statement_date(input: &str) -> ReconcileResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), STATEMENT_DATE_FORMAT).map_err(|_| {
        ReconcileError::Validation(format!(
            "'{}' is not a valid date (expected day-month-year)",
            input.trim()
        ))
    })
}

/// Validate that a bank account ID is well formed
pub fn validate_bank_account_id(bank_account_id: &str) -> ReconcileResult<()> {
    if bank_account_id.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Bank account ID cannot be empty".to_string(),
        ));
    }

    if bank_account_id.len() > 50 {
        return Err(ReconcileError::Validation(
            "Bank account ID cannot exceed 50 characters".to_string(),
        ));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !bank_account_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ReconcileError::Validation(
            "Bank account ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that a statement date is not in the future
pub fn validate_statement_date(date: NaiveDate, today: NaiveDate) -> ReconcileResult<()> {
    if date > today {
        return Err(ReconcileError::Validation(format!(
            "Statement date {} is in the future",
            date
        )));
    }
    Ok(())
}
