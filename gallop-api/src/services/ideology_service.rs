//! Ideology Service
//!
//! Topic aggregates and the topic catalog, computed from the record store
//! and cached under [`CacheKey::IdeologyByTopic`] and
//! [`CacheKey::IdeologyTopics`].

use std::sync::Arc;

use gallop_core::{count_by_topic, list_topics, CacheKey, Record, StateCount, Topic};
use gallop_storage::{CacheAside, RecordStore};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct IdeologyService {
    cache: CacheAside,
    records: Arc<dyn RecordStore>,
}

impl IdeologyService {
    pub fn new(cache: CacheAside, records: Arc<dyn RecordStore>) -> Self {
        Self { cache, records }
    }

    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    /// Per-state counts of records labeled with `topic`.
    ///
    /// `Ok(None)` means nothing matched; that result is not cached.
    pub async fn get_ideology_data_for_topic(
        &self,
        topic: &Topic,
    ) -> ApiResult<Option<Vec<StateCount>>> {
        let key = CacheKey::IdeologyByTopic(topic.clone()).to_string();
        let records = &self.records;

        self.cache
            .get_or_compute_default(&key, || async move {
                let all = records.fetch_records().await?;
                Ok::<_, ApiError>(Some(count_by_topic(topic, &all)))
            })
            .await
    }

    /// Sorted, de-duplicated list of every label in the record store.
    pub async fn get_ideology_topics(&self) -> ApiResult<Option<Vec<String>>> {
        let key = CacheKey::IdeologyTopics.to_string();
        let records = &self.records;

        self.cache
            .get_or_compute_default(&key, || async move {
                let all = records.fetch_records().await?;
                Ok::<_, ApiError>(Some(list_topics(&all)))
            })
            .await
    }

    /// Every normalized record.
    pub async fn get_combined_data(&self) -> ApiResult<Option<Vec<Record>>> {
        let key = CacheKey::CombinedData.to_string();
        let records = &self.records;

        self.cache
            .get_or_compute_default(&key, || async move {
                Ok::<_, ApiError>(Some(records.fetch_records().await?))
            })
            .await
    }

    /// Recompute and overwrite the aggregate for `topic`.
    pub async fn refresh_topic_aggregate(&self, topic: &Topic) -> ApiResult<Vec<StateCount>> {
        let key = CacheKey::IdeologyByTopic(topic.clone()).to_string();
        let records = &self.records;
        let ttl = self.cache.config().default_ttl;

        let counts = self
            .cache
            .refresh(
                &key,
                || async move {
                    let all = records.fetch_records().await?;
                    Ok::<_, ApiError>(count_by_topic(topic, &all))
                },
                ttl,
            )
            .await?;

        tracing::info!(topic = %topic, states = counts.len(), "Refreshed topic aggregate");
        Ok(counts)
    }

    /// Recompute and overwrite the topic catalog.
    pub async fn refresh_topic_catalog(&self) -> ApiResult<Vec<String>> {
        let key = CacheKey::IdeologyTopics.to_string();
        let records = &self.records;
        let ttl = self.cache.config().default_ttl;

        let topics = self
            .cache
            .refresh(
                &key,
                || async move {
                    let all = records.fetch_records().await?;
                    Ok::<_, ApiError>(list_topics(&all))
                },
                ttl,
            )
            .await?;

        tracing::info!(topics = topics.len(), "Refreshed topic catalog");
        Ok(topics)
    }
}
