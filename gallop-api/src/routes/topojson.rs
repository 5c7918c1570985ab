//! TopoJSON REST API Routes
//!
//! Boundary documents for the state and congressional district maps.
//! Each layer supports reading the latest document and storing a new one.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::error::ApiResult;
use crate::services::DatasetService;
use crate::state::AppState;
use crate::types::{CreateTopojsonRequest, NoDataError, TopoLayer, TopojsonRow};

async fn read_layer(service: &DatasetService, layer: TopoLayer) -> ApiResult<Response> {
    Ok(match service.get_topojson(layer).await? {
        Some(topojson) => Json(topojson).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NoDataError::new("No TopoJSON data found")),
        )
            .into_response(),
    })
}

/// Missing fields and malformed bodies are `INVALID_INPUT`, not a 422.
async fn create_layer(
    service: &DatasetService,
    layer: TopoLayer,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TopojsonRow>)> {
    let req: CreateTopojsonRequest = serde_json::from_slice(&body)?;
    let row = service.create_topojson(layer, req.topojson).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

// ============================================================================
// STATES
// ============================================================================

/// GET /api/us_states_topojson/ - Latest state boundaries
#[utoipa::path(
    get,
    path = "/api/us_states_topojson/",
    tag = "TopoJSON",
    responses(
        (status = 200, description = "TopoJSON topology"),
        (status = 404, description = "No document stored", body = NoDataError),
    ),
)]
pub async fn get_states(State(service): State<DatasetService>) -> ApiResult<Response> {
    read_layer(&service, TopoLayer::States).await
}

/// POST /api/us_states_topojson/ - Store state boundaries
#[utoipa::path(
    post,
    path = "/api/us_states_topojson/",
    tag = "TopoJSON",
    request_body = CreateTopojsonRequest,
    responses(
        (status = 201, description = "Document stored", body = TopojsonRow),
        (status = 400, description = "Malformed body, or topojson missing or not an object", body = crate::error::ApiError),
    ),
)]
pub async fn create_states(
    State(service): State<DatasetService>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TopojsonRow>)> {
    create_layer(&service, TopoLayer::States, body).await
}

// ============================================================================
// DISTRICTS
// ============================================================================

/// GET /api/us_districts_topojson/ - Latest congressional district boundaries
#[utoipa::path(
    get,
    path = "/api/us_districts_topojson/",
    tag = "TopoJSON",
    responses(
        (status = 200, description = "TopoJSON topology"),
        (status = 404, description = "No document stored", body = NoDataError),
    ),
)]
pub async fn get_districts(State(service): State<DatasetService>) -> ApiResult<Response> {
    read_layer(&service, TopoLayer::Districts).await
}

/// POST /api/us_districts_topojson/ - Store congressional district boundaries
#[utoipa::path(
    post,
    path = "/api/us_districts_topojson/",
    tag = "TopoJSON",
    request_body = CreateTopojsonRequest,
    responses(
        (status = 201, description = "Document stored", body = TopojsonRow),
        (status = 400, description = "Malformed body, or topojson missing or not an object", body = crate::error::ApiError),
    ),
)]
pub async fn create_districts(
    State(service): State<DatasetService>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TopojsonRow>)> {
    create_layer(&service, TopoLayer::Districts, body).await
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/us_states_topojson/", get(get_states).post(create_states))
        .route(
            "/us_districts_topojson/",
            get(get_districts).post(create_districts),
        )
}
