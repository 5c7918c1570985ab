//! GALLOP Storage - Cache Stores, Cache-Aside and Record Stores
//!
//! - [`CacheStore`]: key/value store with TTL, backed by Redis in
//!   production and by [`InMemoryCacheStore`] in tests.
//! - [`CacheAside`]: read-through-on-miss wrapper that never caches empty
//!   results on the read path.
//! - [`RecordStore`]: source of labeled records for aggregation.

pub mod cache;
pub mod records;

pub use cache::{
    CacheAside, CacheConfig, CacheEvent, CacheObserver, CacheStats, CacheStore, CacheValue,
    InMemoryCacheStore, RedisCacheStore, RedisConfig, DEFAULT_CACHE_TTL,
};
pub use records::{InMemoryRecordStore, RecordStore};
