//! Refresh Workers and Scheduler
//!
//! A fixed pool of workers drains the [`JobQueue`] receiver. Each job is
//! attempted up to [`RetryPolicy::max_attempts`] times with exponential
//! backoff; a job that exhausts its attempts is logged and dropped, and the
//! cache keeps whatever entry it had.
//!
//! The scheduler enqueues the topic catalog plus every configured warm
//! topic on each interval tick. Both stop when the shutdown signal flips.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::constants::{
    DEFAULT_REFRESH_BACKOFF_MS, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REFRESH_MAX_ATTEMPTS,
    DEFAULT_REFRESH_MAX_BACKOFF_MS, DEFAULT_REFRESH_QUEUE_CAPACITY, DEFAULT_REFRESH_WORKERS,
};
use crate::services::IdeologyService;
use crate::telemetry::record_refresh_job;

use super::queue::{JobQueue, QueueError, RefreshJob};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Retry schedule for a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per job, including the first (minimum 1)
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_REFRESH_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_REFRESH_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_REFRESH_MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Configuration for the refresh worker pool and scheduler.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Whether workers and the scheduler are started at all
    pub enabled: bool,
    /// Number of concurrent workers
    pub workers: usize,
    /// Interval between scheduled refresh rounds
    pub interval: Duration,
    /// Topics whose aggregates are refreshed on every round
    pub topics: Vec<String>,
    /// Pending job capacity
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: DEFAULT_REFRESH_WORKERS,
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            topics: Vec::new(),
            queue_capacity: DEFAULT_REFRESH_QUEUE_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}

impl RefreshConfig {
    /// Create RefreshConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `GALLOP_REFRESH_ENABLED`: Start workers and scheduler (default: true)
    /// - `GALLOP_REFRESH_WORKERS`: Worker count (default: 2)
    /// - `GALLOP_REFRESH_INTERVAL_SECS`: Scheduler interval (default: 3600)
    /// - `GALLOP_REFRESH_TOPICS`: Comma-separated warm topics (default: none)
    /// - `GALLOP_REFRESH_MAX_ATTEMPTS`: Attempts per job (default: 3)
    /// - `GALLOP_REFRESH_BACKOFF_MS`: First retry delay (default: 500)
    /// - `GALLOP_REFRESH_QUEUE_CAPACITY`: Pending job capacity (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("GALLOP_REFRESH_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.enabled);

        let workers = std::env::var("GALLOP_REFRESH_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.workers);

        let interval = std::env::var("GALLOP_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .filter(|d| !d.is_zero())
            .unwrap_or(defaults.interval);

        let topics = std::env::var("GALLOP_REFRESH_TOPICS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let max_attempts = std::env::var("GALLOP_REFRESH_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.retry.max_attempts);

        let initial_backoff = std::env::var("GALLOP_REFRESH_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.initial_backoff);

        let queue_capacity = std::env::var("GALLOP_REFRESH_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.queue_capacity);

        Self {
            enabled,
            workers,
            interval,
            topics,
            queue_capacity,
            retry: RetryPolicy {
                max_attempts,
                initial_backoff,
                max_backoff: defaults.retry.max_backoff,
            },
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters shared by every worker in a pool.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Jobs that eventually succeeded
    pub completed: AtomicU64,
    /// Failed attempts that were retried
    pub retried: AtomicU64,
    /// Jobs dropped after exhausting their attempts
    pub failed: AtomicU64,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RefreshSnapshot {
        RefreshSnapshot {
            completed: self.completed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSnapshot {
    pub completed: u64,
    pub retried: u64,
    pub failed: u64,
}

// ============================================================================
// WORKERS
// ============================================================================

/// Spawn `count` workers sharing one receiver.
///
/// Workers exit when shutdown is signalled or when every [`JobQueue`]
/// handle has been dropped and the queue is drained.
pub fn spawn_refresh_workers(
    count: usize,
    service: IdeologyService,
    receiver: mpsc::Receiver<RefreshJob>,
    policy: RetryPolicy,
    shutdown_rx: watch::Receiver<bool>,
) -> (Vec<JoinHandle<()>>, Arc<RefreshMetrics>) {
    let receiver = Arc::new(Mutex::new(receiver));
    let metrics = Arc::new(RefreshMetrics::new());

    let handles = (0..count.max(1))
        .map(|worker| {
            tokio::spawn(refresh_worker(
                worker,
                service.clone(),
                Arc::clone(&receiver),
                policy.clone(),
                Arc::clone(&metrics),
                shutdown_rx.clone(),
            ))
        })
        .collect();

    tracing::info!(workers = count.max(1), "Refresh workers started");
    (handles, metrics)
}

async fn refresh_worker(
    worker: usize,
    service: IdeologyService,
    receiver: Arc<Mutex<mpsc::Receiver<RefreshJob>>>,
    policy: RetryPolicy,
    metrics: Arc<RefreshMetrics>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let job = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
                continue;
            }
            job = async { receiver.lock().await.recv().await } => job,
        };

        let Some(job) = job else {
            break;
        };
        run_with_retry(worker, &job, &service, &policy, &metrics).await;
    }

    tracing::debug!(worker, "Refresh worker stopped");
}

async fn run_with_retry(
    worker: usize,
    job: &RefreshJob,
    service: &IdeologyService,
    policy: &RetryPolicy,
    metrics: &RefreshMetrics,
) {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match job.run(service).await {
            Ok(()) => {
                metrics.completed.fetch_add(1, Ordering::Relaxed);
                record_refresh_job(job.name(), "completed");
                tracing::debug!(worker, job = job.name(), attempt, "Refresh job completed");
                return;
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                metrics.retried.fetch_add(1, Ordering::Relaxed);
                record_refresh_job(job.name(), "retried");
                tracing::warn!(
                    worker,
                    job = job.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Refresh job failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                metrics.failed.fetch_add(1, Ordering::Relaxed);
                record_refresh_job(job.name(), "failed");
                tracing::error!(
                    worker,
                    job = job.name(),
                    attempts = max_attempts,
                    error = %e,
                    "Refresh job failed"
                );
            }
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Shortest period between scheduled rounds.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Jobs enqueued by one scheduled round.
pub fn scheduled_jobs(config: &RefreshConfig) -> Vec<RefreshJob> {
    std::iter::once(RefreshJob::FetchIdeologyTopics)
        .chain(config.topics.iter().map(RefreshJob::for_topic))
        .collect()
}

/// Enqueue a refresh round on every tick until shutdown.
///
/// The first round is enqueued immediately. Intervals shorter than
/// [`MIN_REFRESH_INTERVAL`] are raised to it. Returns the number of rounds.
pub async fn refresh_schedule_task(
    queue: JobQueue,
    config: RefreshConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> u64 {
    let period = config.interval.max(MIN_REFRESH_INTERVAL);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let jobs = scheduled_jobs(&config);
    let mut rounds = 0u64;

    tracing::info!(
        interval_secs = period.as_secs(),
        topics = config.topics.len(),
        "Refresh scheduler started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                rounds += 1;
                for job in &jobs {
                    match queue.enqueue(job.clone()) {
                        Ok(()) => {}
                        Err(QueueError::Closed) => {
                            tracing::warn!("Refresh queue closed, scheduler stopping");
                            return rounds;
                        }
                        Err(QueueError::Full) => {
                            tracing::warn!(job = job.name(), "Refresh queue full, skipping job");
                        }
                    }
                }
            }
        }
    }

    tracing::info!(rounds, "Refresh scheduler stopped");
    rounds
}

// ============================================================================
// TESTS
// ============================================================================
