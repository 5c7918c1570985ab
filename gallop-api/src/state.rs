//! Shared application state for Axum routers.

use std::sync::Arc;

use gallop_storage::{CacheAside, RecordStore};

use crate::jobs::JobQueue;
use crate::services::{DatasetService, IdeologyService};
use crate::traits::DatasetStore;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub ideology: IdeologyService,
    pub datasets: DatasetService,
    /// Producer side of the refresh queue.
    pub queue: JobQueue,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire both services over one cache.
    pub fn new(
        cache: CacheAside,
        records: Arc<dyn RecordStore>,
        datasets: Arc<dyn DatasetStore>,
        queue: JobQueue,
    ) -> Self {
        Self {
            ideology: IdeologyService::new(cache.clone(), records),
            datasets: DatasetService::new(cache, datasets),
            queue,
            start_time: std::time::Instant::now(),
        }
    }
}

crate::impl_from_ref!(IdeologyService, ideology);
crate::impl_from_ref!(DatasetService, datasets);
crate::impl_from_ref!(JobQueue, queue);
