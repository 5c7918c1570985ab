//! Ideology REST API Routes
//!
//! Per-state topic counts, the topic catalog, and manual refresh requests.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gallop_core::{StateCount, Topic};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::jobs::{JobQueue, RefreshJob};
use crate::services::IdeologyService;
use crate::state::AppState;
use crate::types::{NoDataMessage, RefreshAccepted, RefreshRequest};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/ideology/topics/ - List every topic
#[utoipa::path(
    get,
    path = "/api/ideology/topics/",
    tag = "Ideology",
    responses(
        (status = 200, description = "Sorted topic list", body = Vec<String>),
        (status = 404, description = "No records carry labels", body = NoDataMessage),
        (status = 503, description = "Record store or cache unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn list_topics(State(service): State<IdeologyService>) -> ApiResult<Response> {
    Ok(match service.get_ideology_topics().await? {
        Some(topics) => Json(topics).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NoDataMessage::new("No data found for topics.")),
        )
            .into_response(),
    })
}

/// GET /api/ideology/{topic}/ - Per-state counts for a topic
#[utoipa::path(
    get,
    path = "/api/ideology/{topic}/",
    tag = "Ideology",
    params(
        ("topic" = String, Path, description = "Topic label, matched case-insensitively")
    ),
    responses(
        (status = 200, description = "Counts per state", body = Vec<StateCount>),
        (status = 404, description = "No record matches the topic", body = NoDataMessage),
        (status = 503, description = "Record store or cache unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn get_topic(
    State(service): State<IdeologyService>,
    Path(topic): Path<String>,
) -> ApiResult<Response> {
    let topic = Topic::new(topic);
    Ok(match service.get_ideology_data_for_topic(&topic).await? {
        Some(counts) => Json(counts).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NoDataMessage::new("No data found for topic.")),
        )
            .into_response(),
    })
}

/// POST /api/ideology/refresh/ - Enqueue background refreshes
///
/// An empty body refreshes the topic catalog only. Jobs enqueued before the
/// queue filled up stay queued and are listed under `details.enqueued`.
#[utoipa::path(
    post,
    path = "/api/ideology/refresh/",
    tag = "Ideology",
    request_body(content = RefreshRequest, description = "Topics to refresh", content_type = "application/json"),
    responses(
        (status = 202, description = "Jobs enqueued", body = RefreshAccepted),
        (status = 400, description = "Malformed request body", body = crate::error::ApiError),
        (status = 503, description = "Refresh queue full or closed", body = crate::error::ApiError),
    ),
)]
pub async fn refresh(State(queue): State<JobQueue>, body: Bytes) -> ApiResult<impl IntoResponse> {
    let req: RefreshRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let jobs = refresh_jobs(req);
    let mut enqueued = Vec::with_capacity(jobs.len());
    for job in jobs {
        let name = job.name().to_string();
        if let Err(err) = queue.enqueue(job) {
            return Err(ApiError::from(err).with_details(json!({ "enqueued": enqueued })));
        }
        enqueued.push(name);
    }

    Ok((StatusCode::ACCEPTED, Json(RefreshAccepted { enqueued })))
}

/// Jobs for a refresh request. Blank topics are skipped.
fn refresh_jobs(req: RefreshRequest) -> Vec<RefreshJob> {
    match req.topics {
        None => vec![RefreshJob::FetchIdeologyTopics],
        Some(topics) => topics
            .into_iter()
            .filter(|topic| !topic.trim().is_empty())
            .map(RefreshJob::for_topic)
            .collect(),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/topics/", get(list_topics))
        .route("/refresh/", post(refresh))
        .route("/:topic/", get(get_topic))
}
