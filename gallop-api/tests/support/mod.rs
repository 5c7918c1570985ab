//! Shared fixtures for router-level tests.
//!
//! Everything runs against in-memory stores; no PostgreSQL or Redis needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use gallop_api::jobs::RefreshJob;
use gallop_api::telemetry::PrometheusCacheObserver;
use gallop_api::{
    create_api_router, ApiConfig, AppState, DatasetStore, HealthState, JobQueue, TopoLayer,
    TopojsonRow,
};
use gallop_core::{Record, StorageError};
use gallop_storage::{CacheAside, CacheConfig, InMemoryCacheStore, InMemoryRecordStore};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tower::ServiceExt;

// ============================================================================
// IN-MEMORY DATASETS
// ============================================================================

#[derive(Default)]
pub struct InMemoryDatasetStore {
    members: RwLock<Vec<Value>>,
    proportions: RwLock<Vec<Value>>,
    topojson: RwLock<HashMap<TopoLayer, Vec<TopojsonRow>>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl InMemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_members(&self, rows: Vec<Value>) {
        *self.members.write().await = rows;
    }

    pub async fn set_proportions(&self, rows: Vec<Value>) {
        *self.proportions.write().await = rows;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "in-memory dataset store set to fail".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DatasetStore for InMemoryDatasetStore {
    async fn congress_members(&self) -> Result<Vec<Value>, StorageError> {
        self.check()?;
        Ok(self.members.read().await.clone())
    }

    async fn member_proportions(&self) -> Result<Vec<Value>, StorageError> {
        self.check()?;
        Ok(self.proportions.read().await.clone())
    }

    async fn latest_topojson(
        &self,
        layer: TopoLayer,
    ) -> Result<Option<TopojsonRow>, StorageError> {
        self.check()?;
        Ok(self
            .topojson
            .read()
            .await
            .get(&layer)
            .and_then(|rows| rows.last().cloned()))
    }

    async fn insert_topojson(
        &self,
        layer: TopoLayer,
        topojson: Value,
    ) -> Result<TopojsonRow, StorageError> {
        self.check()?;
        let row = TopojsonRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            topojson,
        };
        self.topojson
            .write()
            .await
            .entry(layer)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.check()
    }
}

// ============================================================================
// TEST APP
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub records: Arc<InMemoryRecordStore>,
    pub datasets: Arc<InMemoryDatasetStore>,
    pub cache: Arc<InMemoryCacheStore>,
    pub jobs: mpsc::Receiver<RefreshJob>,
}

impl TestApp {
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_queue_capacity(records, 16)
    }

    pub fn with_queue_capacity(records: Vec<Record>, capacity: usize) -> Self {
        let records = Arc::new(InMemoryRecordStore::with_records(records));
        let datasets = Arc::new(InMemoryDatasetStore::new());
        let cache = Arc::new(InMemoryCacheStore::new());

        let cache_aside = CacheAside::new(cache.clone(), CacheConfig::new())
            .with_observer(Arc::new(PrometheusCacheObserver));
        let (queue, jobs) = JobQueue::new(capacity);

        let state = AppState::new(cache_aside, records.clone(), datasets.clone(), queue);
        let health = HealthState::new(datasets.clone(), cache.clone());
        let router = create_api_router(state, health, &ApiConfig::default());

        Self {
            router,
            records,
            datasets,
            cache,
            jobs,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
