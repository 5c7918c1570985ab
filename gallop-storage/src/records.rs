//! Record store abstraction.
//!
//! The production implementation is backed by PostgreSQL and lives in
//! `gallop-api`. The in-memory store here serves tests and local runs.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gallop_core::{RawRecord, Record, StorageError};
use tokio::sync::RwLock;

/// Source of labeled records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record, with labels already normalized.
    async fn fetch_records(&self) -> Result<Vec<Record>, StorageError>;
}

/// Record store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<Record>>,
    failing: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
            failing: AtomicBool::new(false),
        }
    }

    /// Build a store from raw rows, normalizing their label fields.
    pub fn from_raw(rows: Vec<RawRecord>) -> Self {
        Self::with_records(rows.into_iter().map(RawRecord::normalize).collect())
    }

    /// Replace the stored records.
    pub async fn replace(&self, records: Vec<Record>) {
        *self.records.write().await = records;
    }

    pub async fn push(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Make subsequent fetches fail with [`StorageError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_records(&self) -> Result<Vec<Record>, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "in-memory record store set to fail".to_string(),
            });
        }
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_from_raw_normalizes_labels() -> Result<(), StorageError> {
        let store = InMemoryRecordStore::from_raw(vec![
            RawRecord::new("CA", json!(["Health", "Crime"])),
            RawRecord::new("TX", json!("['Health']")),
            RawRecord::new("NY", json!("not a list")),
        ]);

        let records = store.fetch_records().await?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].labels, vec!["Health".to_string()]);
        assert!(records[2].labels.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_toggle() {
        let store = InMemoryRecordStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.fetch_records().await,
            Err(StorageError::Unavailable { .. })
        ));
        store.set_failing(false);
        assert!(store.fetch_records().await.is_ok());
    }

    #[tokio::test]
    async fn test_replace() -> Result<(), StorageError> {
        let store = InMemoryRecordStore::new();
        store.replace(vec![Record::new("CA", ["Health"])]).await;
        store.push(Record::new("TX", ["Crime"])).await;
        assert_eq!(store.fetch_records().await?.len(), 2);
        Ok(())
    }
}
