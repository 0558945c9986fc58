//! # Error Types
//!
//! Domain-specific error types for tijori-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tijori-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tijori-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI errors (apps/backoffice)                                          │
//! │  └── AppError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → stderr       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric parse failures are deliberately absent from this hierarchy:
//! they are coerced to zero by [`crate::numeric`] and never surface.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document could not be found.
    #[error("{kind} not found: {id}")]
    DocumentNotFound { kind: String, id: i64 },

    /// Document is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Recording a payment against a draft invoice
    /// - Submitting a cancelled document
    /// - Editing a document that is no longer a draft
    #[error("{number} is {current_status}, cannot {operation}")]
    InvalidDocumentStatus {
        number: String,
        current_status: String,
        operation: String,
    },

    /// Barcode sheet requested for zero labels.
    ///
    /// ## User Workflow
    /// ```text
    /// Select items (filter matches nothing)
    ///      │
    ///      ▼
    /// layout_sheets(&[])
    ///      │
    ///      ▼
    /// NothingToGenerate → "no barcodes to generate"
    /// ```
    #[error("no barcodes to generate")]
    NothingToGenerate,

    /// Identifier contains characters the barcode symbology cannot carry.
    #[error("cannot encode '{value}' as Code 128: {reason}")]
    Unencodable { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// A validation failure never results in a partial write.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date, non-numeric id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate document number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidDocumentStatus {
            number: "INV20240105-00003".to_string(),
            current_status: "draft".to_string(),
            operation: "record payment".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "INV20240105-00003 is draft, cannot record payment"
        );

        assert_eq!(
            CoreError::NothingToGenerate.to_string(),
            "no barcodes to generate"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("counterparty").to_string(),
            "counterparty is required"
        );

        let err = ValidationError::invalid("item_id", "'abc' is not a number");
        assert_eq!(
            err.to_string(),
            "item_id has invalid format: 'abc' is not a number"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
