//! Error types for the job queue

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::job::JobStatus;

/// Result type alias for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors returned by the job queue and its store
#[derive(Debug, Error)]
pub enum QueueError {
    /// The pending channel is at capacity
    #[error("queue is full")]
    QueueFull,

    /// No job with this identifier was ever submitted
    #[error("job not found: {0}")]
    JobNotFound(Uuid),

    /// A job with this identifier is already stored
    #[error("job already exists: {0}")]
    DuplicateJob(Uuid),

    /// The requested lifecycle transition is not allowed
    #[error("invalid transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    /// Configuration error (e.g., zero workers)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The queue no longer accepts work
    #[error("queue is shut down")]
    ShutDown,

    /// Workers did not finish before the shutdown deadline
    #[error("shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),
}

impl QueueError {
    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::JobNotFound(_))
    }
}
