//! Refresh job messages and the bounded queue.
//!
//! Jobs serialize as `{"task": <name>, "args": {...}}` so they can be
//! logged or handed to an external broker unchanged.

use gallop_core::Topic;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::{ApiError, ApiResult};
use crate::services::IdeologyService;

// ============================================================================
// JOBS
// ============================================================================

/// An idempotent cache refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", content = "args", rename_all = "snake_case")]
pub enum RefreshJob {
    /// Recompute the per-state aggregate for one topic.
    FetchIdeologyByTopic { topic: String },
    /// Recompute the topic catalog.
    FetchIdeologyTopics,
}

impl RefreshJob {
    pub fn for_topic(topic: impl Into<String>) -> Self {
        RefreshJob::FetchIdeologyByTopic {
            topic: topic.into(),
        }
    }

    /// Task name, also used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            RefreshJob::FetchIdeologyByTopic { .. } => "fetch_ideology_by_topic",
            RefreshJob::FetchIdeologyTopics => "fetch_ideology_topics",
        }
    }

    /// Execute the job once.
    pub async fn run(&self, service: &IdeologyService) -> ApiResult<()> {
        match self {
            RefreshJob::FetchIdeologyByTopic { topic } => {
                service.refresh_topic_aggregate(&Topic::new(topic)).await?;
            }
            RefreshJob::FetchIdeologyTopics => {
                service.refresh_topic_catalog().await?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// QUEUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("refresh queue is closed")]
    Closed,

    #[error("refresh queue is full")]
    Full,
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        tracing::warn!(error = %err, "Refresh job rejected");
        ApiError::queue_unavailable(err.to_string())
    }
}

/// Cloneable producer handle for refresh jobs.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<RefreshJob>,
}

impl JobQueue {
    /// Create a queue holding at most `capacity` pending jobs.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RefreshJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue without waiting. Fails when the queue is full or the
    /// workers have shut down.
    pub fn enqueue(&self, job: RefreshJob) -> Result<(), QueueError> {
        let name = job.name();
        match self.sender.try_send(job) {
            Ok(()) => {
                tracing::debug!(job = name, "Refresh job enqueued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(QueueError::Full),
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
