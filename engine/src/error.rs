//! Error types for the Tabula engine.
//!
//! Most engine operations never fail: unknown ids are no-ops and out-of-range
//! pages are clamped. Errors are reserved for malformed input crossing the
//! engine boundary.

use crate::RecordId;
use thiserror::Error;

/// All possible errors from the Tabula engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Input errors
    #[error("record already exists: {0}")]
    DuplicateId(RecordId),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
