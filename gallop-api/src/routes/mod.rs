//! REST API Routes Module
//!
//! Includes:
//! - Ideology aggregates and topic catalog under /api/ideology/*
//! - Member tables and combined records under /api/*
//! - TopoJSON boundary documents under /api/*_topojson/
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for the browser dashboard

pub mod health;
pub mod ideology;
pub mod members;
pub mod topojson;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use health::HealthState;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS
// ============================================================================

/// Build the CORS layer.
///
/// With no configured origins every origin is allowed. Otherwise origins
/// are matched by [`ApiConfig::is_origin_allowed`], which also understands
/// `*.domain` wildcards.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let matcher = config.clone();
        let cors = cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| matcher.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ));

        if config.cors_allow_credentials {
            cors.allow_credentials(true)
        } else {
            cors
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Ideology, member and TopoJSON routes under /api/*
/// - Health checks at /health/*
/// - Metrics at /metrics
/// - OpenAPI spec at /openapi.json
pub fn create_api_router(state: AppState, health: HealthState, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .nest("/ideology", ideology::create_router())
        .merge(members::create_router())
        .merge(topojson::create_router());

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .nest("/health", health::create_router(health))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}
