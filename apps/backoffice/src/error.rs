//! # Application Error Type
//!
//! One error type for every command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in tijori                                 │
//! │                                                                         │
//! │  tijori docs submit 42                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command handler                                                 │  │
//! │  │  AppResult<()>                                                   │  │
//! │  │         │                                                        │  │
//! │  │  DbError::NotFound ──────────────► ErrorKind::NotFound           │  │
//! │  │  DbError::UniqueViolation ───────► ErrorKind::Validation         │  │
//! │  │  CoreError::InvalidDocumentStatus ► ErrorKind::Validation        │  │
//! │  │  DbError::QueryFailed ───────────► ErrorKind::Storage (logged)   │  │
//! │  │  io / csv / zip ─────────────────► ErrorKind::Io                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  main: "error: SO20240105-00001 is submitted, cannot edit"              │
//! │        exit code from ErrorKind                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tijori_core::{CoreError, ValidationError};
use tijori_db::DbError;

use crate::config::ConfigError;

/// Error reported to the operator.
///
/// ## Serialization
/// With `--json` a failing command prints this to stderr:
/// ```json
/// { "kind": "NOT_FOUND", "message": "Item not found: 17" }
/// ```
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct AppError {
    /// Machine-readable category
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input rejected, nothing written
    Validation,

    /// Lookup matched nothing
    NotFound,

    /// Database failure
    Storage,

    /// File or stream failure
    Io,

    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Process exit code for this category.
    pub const fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::Validation => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Storage => 4,
            ErrorKind::Io => 5,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorKind::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorKind::Validation, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        AppError::new(ErrorKind::Io, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorKind::Internal, message)
    }
}

/// Converts database errors to application errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                AppError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::validation("Record is referenced elsewhere or refers to a missing record")
            }
            DbError::CheckViolation { message } => {
                AppError::validation(format!("Constraint violation: {}", message))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorKind::Storage, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorKind::Storage, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorKind::Storage, "Database operation failed")
            }
            DbError::PoolExhausted => AppError::new(ErrorKind::Storage, "Database pool exhausted"),
            DbError::Validation(e) => e.into(),
            DbError::Domain(e) => e.into(),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to application errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DocumentNotFound { kind, id } => AppError::not_found(&kind, &id.to_string()),
            CoreError::Validation(e) => e.into(),
            other => AppError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            AppError::io(err.to_string())
        } else {
            AppError::validation(format!("CSV: {}", err))
        }
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::io(format!("Archive: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => AppError::io(err.to_string()),
            _ => AppError::validation(format!("JSON: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_kinds() {
        let err: AppError = DbError::not_found("Item", 17).into();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Item not found: 17");

        let err: AppError = DbError::duplicate("sku", "MM-001").into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "sku 'MM-001' already exists");

        let err: AppError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_domain_errors_are_validation() {
        let err: AppError = DbError::Domain(CoreError::InvalidDocumentStatus {
            number: "SO20240105-00001".to_string(),
            current_status: "submitted".to_string(),
            operation: "edit".to_string(),
        })
        .into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "SO20240105-00001 is submitted, cannot edit");

        let err: AppError = CoreError::NothingToGenerate.into();
        assert_eq!(err.to_string(), "no barcodes to generate");
    }

    #[test]
    fn test_json_errors() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.starts_with("JSON:"));
    }

    #[test]
    fn test_exit_codes_are_non_zero() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::Storage,
            ErrorKind::Io,
            ErrorKind::Internal,
        ] {
            assert_ne!(kind.exit_code(), 0);
        }
    }
}
