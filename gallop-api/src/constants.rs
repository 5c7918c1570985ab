//! Constants for GALLOP API
//!
//! Defaults shared by the configuration types and their tests.

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_API_PORT: u16 = 8000;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// DATABASE
// ============================================================================

/// Default maximum pool size
pub const DEFAULT_DB_POOL_SIZE: usize = 16;

/// Default pool checkout timeout in seconds
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// REFRESH JOBS
// ============================================================================

/// Default number of refresh workers
pub const DEFAULT_REFRESH_WORKERS: usize = 2;

/// Default interval between scheduled refresh rounds (1 hour)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Default attempts per job, including the first
pub const DEFAULT_REFRESH_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
pub const DEFAULT_REFRESH_BACKOFF_MS: u64 = 500;

/// Upper bound on the retry delay
pub const DEFAULT_REFRESH_MAX_BACKOFF_MS: u64 = 30_000;

/// Default bounded queue capacity
pub const DEFAULT_REFRESH_QUEUE_CAPACITY: usize = 256;
