//! Database error types.

use symptom_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The URI does not address a resource, or the resource does not accept
    /// the operation.
    #[error("unsupported operation: {operation} on {uri}")]
    UnsupportedOperation { operation: &'static str, uri: String },

    /// The store wrote no row (for instance an IGNORE conflict on a single insert).
    #[error("insert failed: {0}")]
    InsertFailed(String),

    #[error("invalid uri: {0}")]
    InvalidUri(String),

    #[error("unknown column {column} for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("cannot downgrade database from version {found} to {expected}")]
    Downgrade { found: u32, expected: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<CoreError> for DbError {
    fn from(e: CoreError) -> Self {
        Self::InvalidData(e.to_string())
    }
}

impl DbError {
    pub(crate) fn unsupported(operation: &'static str, uri: impl ToString) -> Self {
        Self::UnsupportedOperation {
            operation,
            uri: uri.to_string(),
        }
    }
}
