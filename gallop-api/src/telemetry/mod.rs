//! GALLOP Telemetry - Observability Infrastructure
//!
//! Structured logging through `tracing` and Prometheus metrics for the
//! HTTP surface, the cache-aside layer and the refresh workers.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{
    metrics_handler, record_refresh_job, GallopMetrics, PrometheusCacheObserver, METRICS,
};
pub use middleware::{normalize_path, observability_middleware};
pub use tracer::{init_tracer, TelemetryConfig};
