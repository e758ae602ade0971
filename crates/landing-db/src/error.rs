//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      Timeout (tokio)    ValidationError     │
//! │       │                               │                  │              │
//! │       ▼                               ▼                  ▼              │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── constraint violation → handler may regenerate / report 409   │
//! │       ├── validation           → handler reports 400                   │
//! │       └── storage error        → handler reports generic 500           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing record is never a `DbError`: lookups return `Ok(None)`,
//! updates return `Ok(None)` and deletes return `Ok(false)`.

use landing_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before reaching the database.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Slug already used by another product
    /// - Public `product_id` already taken
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating an ingredient or why-choose item for a missing product
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Every generated public product id collided with an existing one.
    #[error("Could not allocate a unique product id after {attempts} attempts")]
    IdentifierExhausted { attempts: u32 },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Operation exceeded its time budget.
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>) -> Self {
        DbError::Timeout {
            operation: operation.into(),
        }
    }

    /// True for uniqueness and foreign-key violations.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. }
        )
    }

    /// True when a UNIQUE constraint on `column` rejected the write.
    ///
    /// `column` is matched against the `table.column` name SQLite reports,
    /// e.g. `"products.product_id"`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        match self {
            DbError::UniqueViolation { field, .. } => {
                field.split(", ").any(|name| name.trim() == column)
            }
            _ => false,
        }
    }

    /// True for connectivity, timeout and other engine faults.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::MigrationFailed(_)
                | DbError::QueryFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::PoolExhausted
                | DbError::Timeout { .. }
                | DbError::Internal(_)
        )
    }

    /// True when the operation ran out of time or waited too long for a
    /// connection.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DbError::Timeout { .. } | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (unique)       → DbError::UniqueViolation
/// sqlx::Error::Database (foreign key)  → DbError::ForeignKeyViolation
/// sqlx::Error::Database (other)        → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut            → DbError::PoolExhausted
/// sqlx::Error::PoolClosed              → DbError::ConnectionFailed
/// sqlx::Error::Io / Tls                → DbError::ConnectionFailed
/// Other                                → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                match db_err.kind() {
                    // SQLite: "UNIQUE constraint failed: products.slug"
                    sqlx::error::ErrorKind::UniqueViolation => {
                        let field = msg
                            .split("UNIQUE constraint failed: ")
                            .nth(1)
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::UniqueViolation {
                            field,
                            value: "unknown".to_string(),
                        }
                    }
                    sqlx::error::ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    },
                    _ => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unique = DbError::duplicate("products.slug", "keto-burn");
        assert!(unique.is_constraint_violation());
        assert!(!unique.is_storage_error());
        assert!(unique.is_unique_violation_on("products.slug"));
        assert!(!unique.is_unique_violation_on("products.product_id"));

        let fk = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        };
        assert!(fk.is_constraint_violation());

        let timeout = DbError::timeout("products.count");
        assert!(timeout.is_storage_error());
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "Operation timed out: products.count");

        assert!(DbError::PoolExhausted.is_timeout());
        assert!(DbError::PoolExhausted.is_storage_error());

        let exhausted = DbError::IdentifierExhausted { attempts: 5 };
        assert!(!exhausted.is_constraint_violation());
        assert!(!exhausted.is_storage_error());
    }

    #[test]
    fn test_validation_converts() {
        let err: DbError = ValidationError::required("name").into();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name is required");
    }

    #[test]
    fn test_pool_errors_convert() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::Internal(_)
        ));
    }
}
