//! Job record and lifecycle
//!
//! A job moves `Queued -> Processing -> Completed | Failed`. The only
//! shortcut is `Queued -> Failed`, used when a submission is rejected
//! before any worker sees it. Terminal states never change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueueError, Result};

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Returns true for states a job can never leave
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for JobStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Output of a completed job together with how long it took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult<R> {
    pub output: R,
    /// Milliseconds between the worker claiming the job and its completion
    pub processing_time_ms: i64,
}

/// Job execution record
///
/// `P` is the caller's parameter payload and `R` the processor's output.
/// Neither is inspected by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job<P, R> {
    pub id: Uuid,
    pub params: P,
    pub status: JobStatus,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub result: Option<JobResult<R>>,
}

impl<P, R> Job<P, R> {
    /// Creates a queued job
    pub fn new(id: Uuid, params: P, queued_at: DateTime<Utc>) -> Self {
        Self {
            id,
            params,
            status: JobStatus::Queued,
            queued_at,
            started_at: None,
            completed_at: None,
            error_message: None,
            result: None,
        }
    }

    /// Marks the job as claimed by a worker
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.check_transition(JobStatus::Queued, JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.started_at = Some(now);
        Ok(())
    }

    /// Records a successful outcome
    pub fn complete(&mut self, now: DateTime<Utc>, result: JobResult<R>) -> Result<()> {
        self.check_transition(JobStatus::Processing, JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        self.result = Some(result);
        Ok(())
    }

    /// Records a processing failure
    pub fn fail(&mut self, now: DateTime<Utc>, message: impl Into<String>) -> Result<()> {
        self.check_transition(JobStatus::Processing, JobStatus::Failed)?;
        self.finish_failed(now, message.into());
        Ok(())
    }

    /// Fails a job that was never handed to a worker
    pub fn reject(&mut self, now: DateTime<Utc>, message: impl Into<String>) -> Result<()> {
        self.check_transition(JobStatus::Queued, JobStatus::Failed)?;
        self.finish_failed(now, message.into());
        Ok(())
    }

    fn finish_failed(&mut self, now: DateTime<Utc>, mut message: String) {
        // A failed job always carries a message
        if message.is_empty() {
            message = "unknown error".to_string();
        }
        self.status = JobStatus::Failed;
        self.completed_at = Some(now);
        self.error_message = Some(message);
    }

    fn check_transition(&self, expected: JobStatus, to: JobStatus) -> Result<()> {
        if self.status != expected {
            return Err(QueueError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}
