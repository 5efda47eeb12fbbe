//! Error types for symptom-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when decoding stored domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: i64 },
}
