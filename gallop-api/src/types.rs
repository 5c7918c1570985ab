//! API Request and Response Types
//!
//! Bodies exchanged by the REST routes. Aggregate payloads (`StateCount`,
//! `Record`) come from `gallop-core`; member and proportion rows are passed
//! through as JSON objects exactly as the database returns them.

use gallop_core::CacheKey;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ============================================================================
// TOPOJSON
// ============================================================================

/// Which boundary layer a TopoJSON document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopoLayer {
    States,
    Districts,
}

impl TopoLayer {
    /// Backing table.
    pub fn table(&self) -> &'static str {
        match self {
            TopoLayer::States => "us_states_topo",
            TopoLayer::Districts => "us_districts_topo",
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        match self {
            TopoLayer::States => CacheKey::StatesTopojson,
            TopoLayer::Districts => CacheKey::DistrictsTopojson,
        }
    }
}

/// A stored TopoJSON row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TopojsonRow {
    pub id: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub topojson: JsonValue,
}

/// Request to store a new TopoJSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateTopojsonRequest {
    /// TopoJSON document; must be a JSON object
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub topojson: JsonValue,
}

// ============================================================================
// EMPTY RESULTS
// ============================================================================

/// 404 body used by the ideology endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NoDataMessage {
    pub message: String,
}

impl NoDataMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 404 body used by the member and TopoJSON endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NoDataError {
    pub error: String,
}

impl NoDataError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ============================================================================
// REFRESH
// ============================================================================

/// Request to enqueue background refresh jobs.
///
/// With no topics only the topic catalog is refreshed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RefreshRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

/// Jobs accepted by the refresh queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RefreshAccepted {
    /// Job names in enqueue order
    pub enqueued: Vec<String>,
}
