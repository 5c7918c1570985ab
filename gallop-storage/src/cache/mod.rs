//! Cache layer: pluggable stores and the cache-aside wrapper.

mod cache_aside;
mod memory;
mod redis_backend;
mod traits;

pub use cache_aside::{CacheAside, CacheConfig, CacheEvent, CacheObserver, DEFAULT_CACHE_TTL};
pub use memory::InMemoryCacheStore;
pub use redis_backend::{RedisCacheStore, RedisConfig};
pub use traits::{CacheStats, CacheStore, CacheValue};
