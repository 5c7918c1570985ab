//! OpenAPI Specification for GALLOP API
//!
//! Generated with utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{health, ideology, members, topojson};
use crate::telemetry::metrics;
use crate::types::*;

use gallop_core::{Record, StateCount};

/// OpenAPI document for GALLOP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GALLOP API",
        version = "0.1.0",
        description = "Congressional records, district boundaries and ideology-by-topic aggregates for the GALLOP dashboard",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    tags(
        (name = "Ideology", description = "Per-state topic counts and the topic catalog"),
        (name = "Members", description = "Congress members, proportions and combined records"),
        (name = "TopoJSON", description = "State and district boundary documents"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    ),
    paths(
        ideology::list_topics,
        ideology::get_topic,
        ideology::refresh,
        members::congress_members,
        members::member_proportions,
        members::combined_data,
        topojson::get_states,
        topojson::create_states,
        topojson::get_districts,
        topojson::create_districts,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        StateCount,
        Record,
        TopojsonRow,
        CreateTopojsonRequest,
        NoDataMessage,
        NoDataError,
        RefreshRequest,
        RefreshAccepted,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "GALLOP API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 5);

        for path in [
            "/api/ideology/topics/",
            "/api/ideology/{topic}/",
            "/api/ideology/refresh/",
            "/api/us_states_topojson/",
            "/health/ready",
            "/metrics",
        ] {
            assert!(
                openapi.paths.paths.contains_key(path),
                "missing path {}",
                path
            );
        }
        Ok(())
    }

    #[test]
    fn test_openapi_to_json() -> Result<(), serde_json::Error> {
        let json = ApiDoc::to_json()?;
        assert!(json.contains("\"StateCount\""));
        assert!(json.contains("No data found") || json.contains("NoDataMessage"));
        Ok(())
    }
}
