//! API Error Types
//!
//! Every failure leaves the server as `{code, message, details?}` JSON with
//! the status implied by its [`ErrorCode`]. Store errors are logged in full
//! and reduced to a generic message before they reach the client.
//!
//! "No data" responses are not errors; route handlers build those bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallop_core::{CacheError, GallopError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed body or a payload of the wrong shape (400)
    InvalidInput,

    /// Startup or encoding failure inside the server (500)
    InternalError,

    /// Query or row decoding failed (500)
    DatabaseError,

    /// Cache store rejected a command or an entry could not be encoded (500)
    CacheError,

    /// Record store, database or cache unreachable (503)
    ServiceUnavailable,

    /// No pooled database connection within the checkout timeout (503)
    ConnectionPoolExhausted,

    /// Refresh queue full or shut down (503)
    QueueUnavailable,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::ServiceUnavailable
            | ErrorCode::ConnectionPoolExhausted
            | ErrorCode::QueueUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError | ErrorCode::DatabaseError | ErrorCode::CacheError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid request",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database query failed",
            ErrorCode::CacheError => "Cache operation failed",
            ErrorCode::ServiceUnavailable => "Backing store unavailable",
            ErrorCode::ConnectionPoolExhausted => "No database connection available",
            ErrorCode::QueueUnavailable => "Refresh queue unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR
// ============================================================================

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Structured context, e.g. `{"field": "topojson"}`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the code's [`default_message`](ErrorCode::default_message).
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn queue_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::QueueUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!(error = %err, "Postgres error");
        if err.is_closed() {
            return ApiError::from_code(ErrorCode::ServiceUnavailable);
        }
        ApiError::from_code(ErrorCode::DatabaseError)
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!(error = %err, "Connection pool error");
        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                ApiError::from_code(ErrorCode::ConnectionPoolExhausted)
            }
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::from_code(ErrorCode::ServiceUnavailable),
        }
    }
}

/// Request bodies that fail to decode.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "Rejected request body");
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Record store failures. Details are logged, not returned.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Record store error");
        match err {
            StorageError::Unavailable { .. } => {
                ApiError::service_unavailable("Record store unavailable")
            }
            StorageError::QueryFailed { .. } | StorageError::DecodeFailed { .. } => {
                ApiError::from_code(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Cache store failures surface to the caller; there is no silent fallback.
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::error!(error = %err, "Cache store error");
        match err {
            CacheError::Unavailable { .. } => ApiError::service_unavailable("Cache unavailable"),
            CacheError::OperationFailed { .. } | CacheError::Serialization { .. } => {
                ApiError::from_code(ErrorCode::CacheError)
            }
        }
    }
}

impl From<GallopError> for ApiError {
    fn from(err: GallopError) -> Self {
        match err {
            GallopError::Storage(e) => e.into(),
            GallopError::Cache(e) => e.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::DatabaseError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ConnectionPoolExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::QueueUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::Unavailable {
            reason: "pool closed".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert!(!err.message.contains("pool closed"));

        let err: ApiError = StorageError::QueryFailed {
            table: "combined_data".to_string(),
            reason: "syntax".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_cache_error_mapping() {
        let err: ApiError = GallopError::Cache(CacheError::Unavailable {
            reason: "timeout".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = CacheError::OperationFailed {
            operation: "SET".to_string(),
            key: "ideology_topics".to_string(),
            reason: "WRONGTYPE".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::CacheError);
        assert_eq!(err.message, "Cache operation failed");
    }

    #[test]
    fn test_pool_closed_maps_to_unavailable() {
        let err: ApiError = deadpool_postgres::PoolError::Closed.into();
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    }

    #[test]
    fn test_invalid_topojson_body_shape() -> Result<(), serde_json::Error> {
        let err = ApiError::invalid_input("topojson must be a JSON object")
            .with_details(serde_json::json!({"field": "topojson"}));
        let body = serde_json::to_value(&err)?;

        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(body["details"]["field"], "topojson");
        assert_eq!(serde_json::from_value::<ApiError>(body)?, err);
        Ok(())
    }

    #[test]
    fn test_details_omitted_when_absent() -> Result<(), serde_json::Error> {
        let body = serde_json::to_value(ApiError::queue_unavailable("Refresh queue is full"))?;
        assert_eq!(body["code"], "QUEUE_UNAVAILABLE");
        assert!(body.get("details").is_none());
        Ok(())
    }
}
