//! Background Jobs for GALLOP API
//!
//! Cache refreshes run off the request path:
//!
//! - `queue`: refresh job messages and the bounded queue that carries them
//! - `refresh`: the worker pool that executes jobs with retries, and the
//!   scheduler that enqueues a warm-up round on every interval tick
//!
//! # Usage
//!
//! ```ignore
//! use gallop_api::jobs::{refresh_schedule_task, spawn_refresh_workers, JobQueue, RefreshConfig};
//! use tokio::sync::watch;
//!
//! let config = RefreshConfig::from_env();
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let (queue, receiver) = JobQueue::new(config.queue_capacity);
//!
//! let (workers, metrics) = spawn_refresh_workers(
//!     config.workers,
//!     ideology_service.clone(),
//!     receiver,
//!     config.retry.clone(),
//!     shutdown_rx.clone(),
//! );
//! tokio::spawn(refresh_schedule_task(queue.clone(), config, shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod queue;
pub mod refresh;

pub use queue::{JobQueue, QueueError, RefreshJob};
pub use refresh::{
    refresh_schedule_task, scheduled_jobs, spawn_refresh_workers, RefreshConfig, RefreshMetrics,
    RefreshSnapshot, RetryPolicy,
};
