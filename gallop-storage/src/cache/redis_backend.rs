//! Redis cache store.
//!
//! One multiplexed [`ConnectionManager`] is shared by every clone of the
//! store; it reconnects on its own after a dropped connection. Entries are
//! written with `SET key value EX ttl`, so expiry is enforced by Redis.
//!
//! Connection and response timeouts are short; a slow cache surfaces as a
//! [`CacheError`] to the caller.

use std::time::Duration;

use async_trait::async_trait;
use gallop_core::CacheError;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client, RedisError,
};

use super::traits::CacheStore;

/// Connection settings for [`RedisCacheStore`].
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL, e.g. `redis://localhost:6379/0`
    pub url: String,
    /// Timeout for establishing a connection
    pub connection_timeout: Duration,
    /// Timeout for a single command round trip
    pub response_timeout: Duration,
    /// Reconnect attempts before a command fails
    pub number_of_retries: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            connection_timeout: Duration::from_millis(500),
            response_timeout: Duration::from_millis(500),
            number_of_retries: 1,
        }
    }
}

impl RedisConfig {
    /// Create a Redis configuration from environment variables.
    ///
    /// - `GALLOP_REDIS_URL` (falls back to `REDIS_URL`)
    /// - `GALLOP_REDIS_CONNECT_TIMEOUT_MS` (default: 500)
    /// - `GALLOP_REDIS_RESPONSE_TIMEOUT_MS` (default: 500)
    /// - `GALLOP_REDIS_RETRIES` (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("GALLOP_REDIS_URL")
                .or_else(|_| std::env::var("REDIS_URL"))
                .unwrap_or(defaults.url),
            connection_timeout: std::env::var("GALLOP_REDIS_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.connection_timeout),
            response_timeout: std::env::var("GALLOP_REDIS_RESPONSE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.response_timeout),
            number_of_retries: std::env::var("GALLOP_REDIS_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.number_of_retries),
        }
    }
}

#[derive(Clone)]
pub struct RedisCacheStore {
    manager: ConnectionManager,
}

impl RedisCacheStore {
    /// Open a client and establish the managed connection.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.url.as_str()).map_err(|e| CacheError::Unavailable {
            reason: format!("invalid Redis URL: {}", e),
        })?;

        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.number_of_retries)
            .set_connection_timeout(config.connection_timeout)
            .set_response_timeout(config.response_timeout);

        let manager = client
            .get_connection_manager_with_config(manager_config)
            .await
            .map_err(|e| CacheError::Unavailable {
                reason: e.to_string(),
            })?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { manager })
    }
}

fn map_redis_error(operation: &str, key: &str, err: RedisError) -> CacheError {
    if err.is_timeout() || err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Unavailable {
            reason: format!("{} {}: {}", operation, key, err),
        }
    } else {
        CacheError::OperationFailed {
            operation: operation.to_string(),
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| map_redis_error("GET", key, e))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        // EX rejects zero.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| map_redis_error("SET", key, e))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("PING", "-", e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config_defaults() {
        let config = RedisConfig::default();
        assert!(config.url.starts_with("redis://"));
        assert_eq!(config.connection_timeout, Duration::from_millis(500));
        assert_eq!(config.number_of_retries, 1);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            ..Default::default()
        };
        let result = RedisCacheStore::connect(&config).await;
        assert!(matches!(result, Err(CacheError::Unavailable { .. })));
    }
}
