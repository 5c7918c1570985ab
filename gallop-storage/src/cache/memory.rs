//! In-process cache store.
//!
//! Used in tests and for single-node development runs without Redis.
//! Expired entries are dropped lazily on read.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use gallop_core::CacheError;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::traits::CacheStore;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| entry.expires_at > now)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: evict unless a writer refreshed it in between.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() -> Result<(), CacheError> {
        let store = InMemoryCacheStore::new();
        store
            .set("ideology_topics", "[\"Health\"]".to_string(), Duration::from_secs(60))
            .await?;
        assert_eq!(
            store.get("ideology_topics").await?,
            Some("[\"Health\"]".to_string())
        );
        assert_eq!(store.get("missing").await?, None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() -> Result<(), CacheError> {
        let store = InMemoryCacheStore::new();
        store
            .set("k", "1".to_string(), Duration::from_secs(10))
            .await?;
        assert!(store.contains_key("k").await);

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(store.get("k").await?, None);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_last_writer_wins() -> Result<(), CacheError> {
        let store = InMemoryCacheStore::new();
        store.set("k", "1".to_string(), Duration::from_secs(60)).await?;
        store.set("k", "2".to_string(), Duration::from_secs(60)).await?;
        assert_eq!(store.get("k").await?, Some("2".to_string()));
        assert_eq!(store.len().await, 1);
        Ok(())
    }
}
