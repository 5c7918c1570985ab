//! Congress Member REST API Routes
//!
//! Read-only views over the member tables and the combined record set.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gallop_core::Record;
use serde::Serialize;

use crate::error::ApiResult;
use crate::services::{DatasetService, IdeologyService};
use crate::state::AppState;
use crate::types::NoDataError;

fn found_or_404<T: Serialize>(data: Option<Vec<T>>) -> Response {
    match data {
        Some(rows) => Json(rows).into_response(),
        None => (StatusCode::NOT_FOUND, Json(NoDataError::new("No data found"))).into_response(),
    }
}

/// GET /api/congress_members/ - Every member row
#[utoipa::path(
    get,
    path = "/api/congress_members/",
    tag = "Members",
    responses(
        (status = 200, description = "Member rows as stored"),
        (status = 404, description = "Table is empty", body = NoDataError),
        (status = 503, description = "Database or cache unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn congress_members(State(service): State<DatasetService>) -> ApiResult<Response> {
    Ok(found_or_404(service.get_congress_members().await?))
}

/// GET /api/member_proportions/ - Members with ideology proportions
#[utoipa::path(
    get,
    path = "/api/member_proportions/",
    tag = "Members",
    responses(
        (status = 200, description = "Proportion rows as stored"),
        (status = 404, description = "Table is empty", body = NoDataError),
        (status = 503, description = "Database or cache unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn member_proportions(State(service): State<DatasetService>) -> ApiResult<Response> {
    Ok(found_or_404(service.get_member_proportions().await?))
}

/// GET /api/combined_data/ - Every labeled record
#[utoipa::path(
    get,
    path = "/api/combined_data/",
    tag = "Members",
    responses(
        (status = 200, description = "Normalized records", body = Vec<Record>),
        (status = 404, description = "No records", body = NoDataError),
        (status = 503, description = "Record store or cache unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn combined_data(State(service): State<IdeologyService>) -> ApiResult<Response> {
    Ok(found_or_404(service.get_combined_data().await?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/congress_members/", get(congress_members))
        .route("/member_proportions/", get(member_proportions))
        .route("/combined_data/", get(combined_data))
}
