//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Every request gets one `http_request` span, one Prometheus sample and
//! one completion log line.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::METRICS;

/// Ideology sub-paths that are routes rather than topics.
const IDEOLOGY_FIXED_SEGMENTS: &[&str] = &["topics", "refresh"];

/// Normalize a path for metric labels and span names.
///
/// Free-form topics and numeric ids are replaced by placeholders so label
/// cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let is_topic = i == 3
                && segments.get(1) == Some(&"api")
                && segments.get(2) == Some(&"ideology")
                && !segment.is_empty()
                && !IDEOLOGY_FIXED_SEGMENTS.contains(segment);

            if is_topic {
                "{topic}"
            } else if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}
