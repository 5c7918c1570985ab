//! GALLOP API server binary.

use std::sync::Arc;

use gallop_api::jobs::{refresh_schedule_task, spawn_refresh_workers, RefreshConfig};
use gallop_api::telemetry::{init_tracer, PrometheusCacheObserver, TelemetryConfig};
use gallop_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig, HealthState,
    JobQueue,
};
use gallop_storage::{
    CacheAside, CacheConfig, CacheStore, InMemoryCacheStore, RedisCacheStore, RedisConfig,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let db = Arc::new(DbClient::from_config(&DbConfig::from_env()?)?);

    let cache_store = connect_cache_store().await?;
    let cache = CacheAside::new(Arc::clone(&cache_store), CacheConfig::from_env())
        .with_observer(Arc::new(PrometheusCacheObserver));

    let refresh_config = RefreshConfig::from_env();
    let (queue, receiver) = JobQueue::new(refresh_config.queue_capacity);
    let state = AppState::new(cache, db.clone(), db.clone(), queue.clone());
    let health = HealthState::new(db.clone(), Arc::clone(&cache_store));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background = Vec::new();
    if refresh_config.enabled {
        let (workers, _metrics) = spawn_refresh_workers(
            refresh_config.workers,
            state.ideology.clone(),
            receiver,
            refresh_config.retry.clone(),
            shutdown_rx.clone(),
        );
        background.extend(workers);
        background.push(tokio::spawn(async move {
            refresh_schedule_task(queue, refresh_config, shutdown_rx).await;
        }));
    } else {
        tracing::info!("Refresh workers disabled");
        drop(receiver);
    }

    let app = create_api_router(state, health, &api_config);

    let addr = api_config.socket_addr()?;
    tracing::info!(%addr, "Starting GALLOP API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    let _ = shutdown_tx.send(true);
    for handle in background {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("GALLOP API stopped");
    Ok(())
}

/// Connect the cache backend selected by `GALLOP_CACHE_BACKEND`
/// (`redis`, the default, or `memory`).
async fn connect_cache_store() -> ApiResult<Arc<dyn CacheStore>> {
    let backend = std::env::var("GALLOP_CACHE_BACKEND").unwrap_or_else(|_| "redis".to_string());
    match backend.as_str() {
        "memory" => {
            tracing::warn!("Using in-process cache; entries are not shared between instances");
            Ok(Arc::new(InMemoryCacheStore::new()))
        }
        "redis" => Ok(Arc::new(
            RedisCacheStore::connect(&RedisConfig::from_env()).await?,
        )),
        other => Err(ApiError::invalid_input(format!(
            "Unknown GALLOP_CACHE_BACKEND: {}",
            other
        ))),
    }
}
