//! Dataset Service
//!
//! Congress member tables and TopoJSON boundaries. Reads go through the
//! cache; TopoJSON writes go straight to the store and the cached copy is
//! replaced when its entry expires.

use std::sync::Arc;

use gallop_core::CacheKey;
use gallop_storage::CacheAside;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, ApiResult};
use crate::traits::DatasetStore;
use crate::types::{TopoLayer, TopojsonRow};

#[derive(Clone)]
pub struct DatasetService {
    cache: CacheAside,
    datasets: Arc<dyn DatasetStore>,
}

impl DatasetService {
    pub fn new(cache: CacheAside, datasets: Arc<dyn DatasetStore>) -> Self {
        Self { cache, datasets }
    }

    pub fn datasets(&self) -> &Arc<dyn DatasetStore> {
        &self.datasets
    }

    pub async fn get_congress_members(&self) -> ApiResult<Option<Vec<JsonValue>>> {
        let key = CacheKey::CongressMembers.to_string();
        let datasets = &self.datasets;

        self.cache
            .get_or_compute_default(&key, || async move {
                Ok::<_, ApiError>(Some(datasets.congress_members().await?))
            })
            .await
    }

    pub async fn get_member_proportions(&self) -> ApiResult<Option<Vec<JsonValue>>> {
        let key = CacheKey::MemberProportions.to_string();
        let datasets = &self.datasets;

        self.cache
            .get_or_compute_default(&key, || async move {
                Ok::<_, ApiError>(Some(datasets.member_proportions().await?))
            })
            .await
    }

    /// Latest TopoJSON document for a layer, tagged as a `Topology`.
    pub async fn get_topojson(&self, layer: TopoLayer) -> ApiResult<Option<JsonValue>> {
        let key = layer.cache_key().to_string();
        let datasets = &self.datasets;

        self.cache
            .get_or_compute_default(&key, || async move {
                let row = datasets.latest_topojson(layer).await?;
                Ok::<_, ApiError>(row.map(|row| as_topology(row.topojson)))
            })
            .await
    }

    /// Store a new TopoJSON document.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `topojson` is a JSON object.
    pub async fn create_topojson(
        &self,
        layer: TopoLayer,
        topojson: JsonValue,
    ) -> ApiResult<TopojsonRow> {
        if !topojson.is_object() {
            return Err(ApiError::invalid_input("topojson must be a JSON object")
                .with_details(serde_json::json!({ "field": "topojson" })));
        }
        Ok(self.datasets.insert_topojson(layer, topojson).await?)
    }
}

/// Default a missing `type` member to `"Topology"`. Non-objects pass through.
pub fn as_topology(mut topojson: JsonValue) -> JsonValue {
    if let Some(map) = topojson.as_object_mut() {
        map.entry("type")
            .or_insert_with(|| JsonValue::String("Topology".to_string()));
    }
    topojson
}
