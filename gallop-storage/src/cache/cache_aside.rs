//! Cache-aside orchestration.
//!
//! [`CacheAside::get_or_compute`] is the read path used by every endpoint:
//! look the key up, and on a miss run the caller's compute closure and
//! store a non-empty result. There is no single-flight: two concurrent
//! misses both compute and both write, and the last write wins.
//!
//! [`CacheAside::refresh`] is the write path used by background jobs. It
//! always recomputes and writes, bypassing the lookup.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gallop_core::CacheError;

use super::traits::{CacheStats, CacheStore, CacheValue};

/// Default entry lifetime: 24 hours.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the cache-aside layer.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL used when the caller does not pass one.
    pub default_ttl: Duration,
    /// Whether background refreshes write results that are empty.
    /// The read path never writes empty results regardless.
    pub refresh_writes_empty: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_CACHE_TTL,
            refresh_writes_empty: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache configuration from environment variables.
    ///
    /// - `GALLOP_CACHE_TTL_SECS` (default: 86400)
    /// - `GALLOP_REFRESH_WRITES_EMPTY` (default: true)
    pub fn from_env() -> Self {
        let default_ttl = std::env::var("GALLOP_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);

        let refresh_writes_empty = std::env::var("GALLOP_REFRESH_WRITES_EMPTY")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            default_ttl,
            refresh_writes_empty,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_refresh_writes_empty(mut self, enabled: bool) -> Self {
        self.refresh_writes_empty = enabled;
        self
    }
}

/// What happened to a key during one cache-aside call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Miss,
    Write,
    SkippedEmpty,
}

impl CacheEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEvent::Hit => "hit",
            CacheEvent::Miss => "miss",
            CacheEvent::Write => "write",
            CacheEvent::SkippedEmpty => "skipped_empty",
        }
    }
}

/// Hook for exporting cache events, e.g. to Prometheus.
pub trait CacheObserver: Send + Sync {
    fn observe(&self, key: &str, event: CacheEvent);
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    skipped_empty: AtomicU64,
}

/// Cache-aside wrapper around a pluggable [`CacheStore`].
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    config: CacheConfig,
    counters: Arc<Counters>,
    observer: Option<Arc<dyn CacheObserver>>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            counters: Arc::new(Counters::default()),
            observer: None,
        }
    }

    pub fn with_defaults(store: Arc<dyn CacheStore>) -> Self {
        Self::new(store, CacheConfig::default())
    }

    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            skipped_empty: self.counters.skipped_empty.load(Ordering::Relaxed),
        }
    }

    fn record(&self, key: &str, event: CacheEvent) {
        let counter = match event {
            CacheEvent::Hit => &self.counters.hits,
            CacheEvent::Miss => &self.counters.misses,
            CacheEvent::Write => &self.counters.writes,
            CacheEvent::SkippedEmpty => &self.counters.skipped_empty,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if let Some(observer) = &self.observer {
            observer.observe(key, event);
        }
    }

    /// Read a cached value.
    ///
    /// A stored value that no longer decodes as `T` is reported as absent,
    /// so the next compute overwrites it.
    pub async fn lookup<T: CacheValue>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Serialize and write a value unconditionally.
    pub async fn put<T: CacheValue>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(key, raw, ttl).await?;
        self.record(key, CacheEvent::Write);
        Ok(())
    }

    /// Return the cached value for `key`, or compute, cache and return it.
    ///
    /// - Hit: returned as stored, `compute` is not called, nothing is written.
    /// - Miss: `compute` runs once. A non-empty result is written with `ttl`
    ///   and returned. An empty or absent result is not written and
    ///   `Ok(None)` is returned, so the next call computes again.
    ///
    /// Errors from `compute` propagate unchanged; cache errors are converted
    /// into `E`.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Duration,
    ) -> Result<Option<T>, E>
    where
        T: CacheValue,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(cached) = self.lookup::<T>(key).await? {
            self.record(key, CacheEvent::Hit);
            tracing::trace!(key, "Cache hit");
            return Ok(Some(cached));
        }
        self.record(key, CacheEvent::Miss);
        tracing::debug!(key, "Cache miss, computing");

        match compute().await? {
            Some(value) if !value.is_empty() => {
                self.put(key, &value, ttl).await?;
                Ok(Some(value))
            }
            _ => {
                self.record(key, CacheEvent::SkippedEmpty);
                Ok(None)
            }
        }
    }

    /// [`get_or_compute`](Self::get_or_compute) with the configured default TTL.
    pub async fn get_or_compute_default<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<Option<T>, E>
    where
        T: CacheValue,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.get_or_compute(key, compute, self.config.default_ttl)
            .await
    }

    /// Recompute and overwrite `key`, skipping the lookup.
    ///
    /// Nothing is written unless `compute` succeeds, so a failing refresh
    /// leaves the previous entry in place. Empty results are written only
    /// when [`CacheConfig::refresh_writes_empty`] is set.
    pub async fn refresh<T, E, F, Fut>(&self, key: &str, compute: F, ttl: Duration) -> Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = compute().await?;
        if value.is_empty() && !self.config.refresh_writes_empty {
            self.record(key, CacheEvent::SkippedEmpty);
            tracing::debug!(key, "Refresh produced empty result, not writing");
            return Ok(value);
        }
        self.put(key, &value, ttl).await?;
        Ok(value)
    }
}
