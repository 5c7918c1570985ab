//! Prometheus Metrics Definitions
//!
//! Defines all GALLOP metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use gallop_core::CacheKey;
use gallop_storage::{CacheEvent, CacheObserver};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<GallopMetrics>> = Lazy::new(GallopMetrics::new);

/// Container for all GALLOP metrics.
#[derive(Clone)]
pub struct GallopMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Cache-aside events - labels: kind, event (hit/miss/write/skipped_empty)
    pub cache_events_total: CounterVec,

    /// Refresh job outcomes - labels: job, status (completed/retried/failed)
    pub refresh_jobs_total: CounterVec,
}

impl GallopMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "gallop_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_requests_total: {}", e))
            })?,

            http_request_duration_seconds: register_histogram_vec!(
                "gallop_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!(
                    "Failed to register http_request_duration_seconds: {}",
                    e
                ))
            })?,

            cache_events_total: register_counter_vec!(
                "gallop_cache_events_total",
                "Cache-aside events by cached view",
                &["kind", "event"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register cache_events_total: {}", e))
            })?,

            refresh_jobs_total: register_counter_vec!(
                "gallop_refresh_jobs_total",
                "Refresh job attempts by outcome",
                &["job", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register refresh_jobs_total: {}", e))
            })?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a cache event. Topic keys collapse into one label value.
    pub fn record_cache_event(&self, key: &str, event: CacheEvent) {
        self.cache_events_total
            .with_label_values(&[CacheKey::kind_of(key), event.as_str()])
            .inc();
    }

    pub fn record_refresh_job(&self, job: &str, status: &str) {
        self.refresh_jobs_total
            .with_label_values(&[job, status])
            .inc();
    }
}

/// Record a refresh job outcome on the global registry.
pub fn record_refresh_job(job: &str, status: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_refresh_job(job, status);
    }
}

/// Forwards cache-aside events to [`METRICS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusCacheObserver;

impl CacheObserver for PrometheusCacheObserver {
    fn observe(&self, key: &str, event: CacheEvent) {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_cache_event(key, event);
        }
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Registers the collectors on first scrape.
    if let Err(e) = METRICS.as_ref() {
        tracing::error!(error = %e, "Metrics unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
