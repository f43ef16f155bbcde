//! # Validation Module
//!
//! Input validation for Stockroom. Runs before any database work, so a
//! rejected request never takes the writer lock.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: THIS MODULE                                                   │
//! │  ├── Required fields, lengths, formats                                 │
//! │  └── Normalization (trimmed names, lower-cased emails)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── CHECK (status IN ('issued','returned'))                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators that normalize return the cleaned value.
//!
//! ```rust
//! use stockroom_core::validation::{validate_email, validate_required};
//!
//! assert_eq!(validate_email(" Ops@Acme.COM ").unwrap(), "ops@acme.com");
//! assert!(validate_required("purpose", "   ", 200).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::PageRequest;
use crate::MAX_ORDER_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field and returns it trimmed.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional free-text field. Blank becomes `None`.
pub fn validate_optional(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => validate_required(field, v, max).map(Some),
    }
}

/// Validates a SKU.
///
/// ## Rules
/// - 1 to 50 characters
/// - Letters, digits, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<String> {
    let sku = validate_required("sku", sku, 50)?;

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(sku)
}

/// Validates an email address and returns it trimmed and lower-cased.
///
/// Only the shape `local@domain.tld` is checked; deliverability is the mail
/// relay's problem.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required("email", email, 254)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "expected local@domain".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(email),
        _ => Err(invalid()),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - 3 to 32 characters
/// - Digits plus `+ - ( ) .` and spaces, at least one digit
pub fn validate_contact_number(number: &str) -> ValidationResult<String> {
    let number = validate_required("contact_number", number, 32)?;

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' ');
    let digits = number.chars().filter(char::is_ascii_digit).count();

    if !number.chars().all(allowed) || digits < 3 {
        return Err(ValidationError::InvalidFormat {
            field: "contact_number".to_string(),
            reason: "must be a phone number".to_string(),
        });
    }

    Ok(number)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order quantity. Missing means 0 (a log-only order).
///
/// ## Rules
/// - 0 to MAX_ORDER_QUANTITY
pub fn validate_order_quantity(qty: Option<i64>) -> ValidationResult<i64> {
    let qty = qty.unwrap_or(0);

    if !(0..=MAX_ORDER_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(qty)
}

/// Validates a restock adjustment.
///
/// ## Rules
/// - Non-zero
/// - Magnitude at most MAX_ORDER_QUANTITY
pub fn validate_restock_quantity(qty: i64) -> ValidationResult<i64> {
    if qty == 0 {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    if qty.abs() > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_ORDER_QUANTITY,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(qty)
}

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<i64> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(cents)
}

/// Validates a low-stock threshold.
pub fn validate_threshold(threshold: i64) -> ValidationResult<i64> {
    if !(0..=MAX_ORDER_QUANTITY).contains(&threshold) {
        return Err(ValidationError::OutOfRange {
            field: "threshold".to_string(),
            min: 0,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(threshold)
}

/// Validates a page request against the configured maximum page size.
///
/// `page` is 1-based.
pub fn validate_page_request(request: PageRequest, max_limit: u32) -> ValidationResult<PageRequest> {
    if request.page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if request.limit == 0 || request.limit > max_limit {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(max_limit),
        });
    }

    Ok(request)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("name", "  Bolts  ", 10).unwrap(), "Bolts");
        assert!(validate_required("name", "", 10).is_err());
        assert!(validate_required("name", &"x".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_optional() {
        assert_eq!(validate_optional("address", None, 10).unwrap(), None);
        assert_eq!(validate_optional("address", Some("  "), 10).unwrap(), None);
        assert_eq!(
            validate_optional("address", Some(" Dock 4 "), 10).unwrap(),
            Some("Dock 4".to_string())
        );
    }

    #[test]
    fn test_validate_sku() {
        assert_eq!(validate_sku(" BOLT-M6 ").unwrap(), "BOLT-M6");
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("Sales@Acme.io").unwrap(), "sales@acme.io");
        assert!(validate_email("no-at-sign.io").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.io").is_err());
        assert!(validate_email("@c.io").is_err());
        assert!(validate_email("a@@c.io").is_err());
    }

    #[test]
    fn test_validate_contact_number() {
        assert!(validate_contact_number("+1 (555) 010-9999").is_ok());
        assert!(validate_contact_number("call me").is_err());
        assert!(validate_contact_number("12").is_err());
    }

    #[test]
    fn test_validate_order_quantity() {
        assert_eq!(validate_order_quantity(None).unwrap(), 0);
        assert_eq!(validate_order_quantity(Some(0)).unwrap(), 0);
        assert_eq!(validate_order_quantity(Some(6)).unwrap(), 6);
        assert!(validate_order_quantity(Some(-1)).is_err());
        assert!(validate_order_quantity(Some(MAX_ORDER_QUANTITY + 1)).is_err());
    }

    #[test]
    fn test_validate_restock_quantity() {
        assert!(validate_restock_quantity(10).is_ok());
        assert!(validate_restock_quantity(-2).is_ok());
        assert!(validate_restock_quantity(0).is_err());
    }

    #[test]
    fn test_validate_price_and_threshold() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_threshold(5).is_ok());
        assert!(validate_threshold(-1).is_err());
    }

    #[test]
    fn test_validate_page_request() {
        assert!(validate_page_request(PageRequest::new(1, 5), 100).is_ok());
        assert!(validate_page_request(PageRequest::new(0, 5), 100).is_err());
        assert!(validate_page_request(PageRequest::new(1, 0), 100).is_err());
        assert!(validate_page_request(PageRequest::new(1, 101), 100).is_err());
    }
}
