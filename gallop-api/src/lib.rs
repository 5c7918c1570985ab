//! GALLOP API - REST Layer, Refresh Workers and PostgreSQL Access
//!
//! Serves the dashboard's JSON endpoints over Axum. Every read goes through
//! the cache-aside layer from `gallop-storage`; background workers keep the
//! ideology aggregates warm.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod jobs;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod secrets;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use jobs::{JobQueue, QueueError, RefreshConfig, RefreshJob, RetryPolicy};
pub use openapi::ApiDoc;
pub use routes::{create_api_router, HealthState};
pub use services::{DatasetService, IdeologyService};
pub use state::AppState;
pub use traits::DatasetStore;
pub use types::*;
