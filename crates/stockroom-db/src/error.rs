//! # Storage Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                         Stock Ledger refusal               │
//! │   ├── RowNotFound ──► NotFound         CoreError::InsufficientStock     │
//! │   ├── "UNIQUE ..." ──► Duplicate       CoreError::ProductNotFound       │
//! │   ├── "FOREIGN KEY ..." ──► ForeignKeyViolation       │                 │
//! │   ├── "CHECK ..." ──► CheckViolation                  │                 │
//! │   ├── pool timeout / closed ──► Unavailable           │                 │
//! │   └── anything else ──► Query                         │                 │
//! │                         │                             │                 │
//! │                         └───────────► DbError ◄───────┘ (Domain)        │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                          ServiceError (stockroom-service)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A delete or update matched no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate value for {column}")]
    Duplicate { column: String },

    /// A row points at a parent that does not exist.
    ///
    /// ## When This Occurs
    /// - Creating a product for a supplier deleted a moment earlier
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A schema CHECK refused the write, e.g. `quantity >= 0`.
    ///
    /// The Stock Ledger guards quantity itself, so seeing this for a product
    /// means a write bypassed it.
    #[error("Check constraint violated: {message}")]
    CheckViolation { message: String },

    /// The pool is closed, or no connection freed up in time.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// The Stock Ledger (or a lookup it made) refused the change.
    #[error(transparent)]
    Domain(#[from] CoreError),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Sorts a SQLite error message into a constraint variant.
    fn from_sqlite_message(message: &str) -> Self {
        const UNIQUE: &str = "UNIQUE constraint failed: ";

        if let Some(column) = message.strip_prefix(UNIQUE) {
            DbError::Duplicate {
                column: column.to_string(),
            }
        } else if message.contains("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation {
                message: message.to_string(),
            }
        } else if message.contains("CHECK constraint failed") {
            DbError::CheckViolation {
                message: message.to_string(),
            }
        } else {
            DbError::Query(message.to_string())
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
