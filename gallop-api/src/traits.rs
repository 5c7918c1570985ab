//! Store traits used by the API services

use async_trait::async_trait;
use gallop_core::StorageError;
use serde_json::Value as JsonValue;

use crate::types::{TopoLayer, TopojsonRow};

/// Reference datasets served by the member and TopoJSON endpoints.
///
/// Implemented by [`DbClient`](crate::db::DbClient) for PostgreSQL; tests
/// use an in-memory implementation.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Every row of `congress_members`, each as a JSON object.
    async fn congress_members(&self) -> Result<Vec<JsonValue>, StorageError>;

    /// Every row of `member_proportions`, each as a JSON object.
    async fn member_proportions(&self) -> Result<Vec<JsonValue>, StorageError>;

    /// The most recently inserted TopoJSON row for a layer.
    async fn latest_topojson(&self, layer: TopoLayer)
        -> Result<Option<TopojsonRow>, StorageError>;

    /// Insert a TopoJSON document and return the stored row.
    async fn insert_topojson(
        &self,
        layer: TopoLayer,
        topojson: JsonValue,
    ) -> Result<TopojsonRow, StorageError>;

    /// Round-trip check used by readiness probes.
    async fn ping(&self) -> Result<(), StorageError>;
}
