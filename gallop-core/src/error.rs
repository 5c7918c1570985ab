//! Error types for GALLOP operations

use thiserror::Error;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Query on {table} failed: {reason}")]
    QueryFailed { table: String, reason: String },

    #[error("Row in {table} could not be decoded: {reason}")]
    DecodeFailed { table: String, reason: String },
}

/// Cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Cache operation '{operation}' on key {key} failed: {reason}")]
    OperationFailed {
        operation: String,
        key: String,
        reason: String,
    },

    #[error("Cache value for key {key} could not be serialized: {reason}")]
    Serialization { key: String, reason: String },
}

/// Reason a stored label payload could not be turned into a label list.
///
/// Never surfaced past the ingestion boundary; a record with an
/// unparsable payload is treated as carrying no labels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("Label payload is blank")]
    Blank,

    #[error("Label payload is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Label payload is JSON but not an array")]
    NotAnArray,
}

/// Master error type for all GALLOP errors.
#[derive(Debug, Clone, Error)]
pub enum GallopError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type alias for GALLOP operations.
pub type GallopResult<T> = Result<T, GallopError>;
