//! Cache store trait, cacheable value marker, and cache statistics.

use std::time::Duration;

use async_trait::async_trait;
use gallop_core::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Marker trait for values that can be cached.
///
/// `is_empty` decides whether a freshly computed value is worth caching.
/// Values that report empty are returned to the caller but never written
/// by the read-through path.
pub trait CacheValue: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn is_empty(&self) -> bool;
}

impl<T> CacheValue for Vec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl CacheValue for serde_json::Value {
    fn is_empty(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Key-value store with per-entry expiry.
///
/// Values are opaque JSON text; (de)serialization happens in
/// [`CacheAside`](super::CacheAside). Implementations must tolerate
/// concurrent writers to the same key, last write wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. `Ok(None)` means absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any existing one, expiring after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of values written.
    pub writes: u64,
    /// Number of computed values not written because they were empty.
    pub skipped_empty: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
