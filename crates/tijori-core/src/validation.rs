//! # Validation Module
//!
//! Input validation for the back office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / JSON form (serde)                                      │
//! │  ├── Unknown fields rejected (deny_unknown_fields)                      │
//! │  └── Numbers coerced leniently (numeric module)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required names, bounded lengths                                   │
//! │  └── Closed value sets (status, direction)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (sku, document number)                                     │
//! │  ├── CHECK (direction, qty > 0, one counterparty)                      │
//! │  └── FOREIGN KEY                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Statuses accepted for customers, suppliers and items.
pub const PARTY_STATUSES: [&str; 2] = ["active", "inactive"];

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (customer, supplier, item).
///
/// ## Example
/// ```rust
/// use tijori_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Kiran Stores ").unwrap(), "Kiran Stores");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional SKU. Blank SKUs become `None`.
///
/// ## Rules
/// - At most 50 characters
/// - Letters, digits, `-`, `_`, `.` and `/` only
/// - Printable ASCII, so it can be carried by a Code 128 barcode
pub fn validate_sku(sku: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(sku) = sku.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(ValidationError::invalid(
            "sku",
            "must contain only letters, numbers, '-', '_', '.' and '/'",
        ));
    }

    Ok(Some(sku.to_string()))
}

/// Validates an optional email address. Blank becomes `None`.
///
/// Only a structural check: one `@` with text on both sides and a dot in
/// the domain.
pub fn validate_email(email: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(email) = email.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::invalid("email", "not an email address"));
    }

    Ok(Some(email.to_string()))
}

/// Validates a search query: trimmed, at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Normalises a status against [`PARTY_STATUSES`]; `None` means "active".
pub fn validate_status(status: Option<&str>) -> ValidationResult<String> {
    let status = status
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| crate::DEFAULT_STATUS.to_string());

    if !PARTY_STATUSES.contains(&status.as_str()) {
        return Err(ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: PARTY_STATUSES.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(status)
}

/// Trims optional free text, mapping blank to `None`.
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock-move quantity: finite and strictly positive.
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount: finite and strictly positive.
pub fn validate_amount(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a price or stock figure on an item: finite and not negative.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a percentage (GST rate, default discount): 0 to 100.
pub fn validate_percent(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
