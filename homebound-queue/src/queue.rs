//! Job queue
//!
//! Public surface of the subsystem: submit, look up, list, stats and
//! shutdown. Coordinates the job store, the bounded pending channel and the
//! worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::job::{Job, JobStatus};
use crate::processor::Processor;
use crate::store::{JobStats, JobStore};
use crate::worker::Worker;

/// Message recorded on jobs rejected because the channel was full
pub const QUEUE_FULL_MESSAGE: &str = "queue is full";

/// Configuration for the job queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of worker tasks, fixed for the queue's lifetime
    pub workers: usize,

    /// Maximum number of jobs waiting for a worker
    ///
    /// Submissions beyond this bound fail immediately.
    pub capacity: usize,
}

impl QueueConfig {
    pub fn new(workers: usize, capacity: usize) -> Self {
        Self { workers, capacity }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(QueueError::InvalidConfig(
                "workers must be greater than 0".into(),
            ));
        }

        if self.capacity == 0 {
            return Err(QueueError::InvalidConfig(
                "capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    /// 5 workers, 100 pending jobs
    fn default() -> Self {
        Self {
            workers: 5,
            capacity: 100,
        }
    }
}

/// In-memory job queue with a fixed worker pool
///
/// # Lifecycle
///
/// 1. Create with [`JobQueue::new`] inside a tokio runtime; workers start immediately
/// 2. Submit work with [`JobQueue::enqueue`] and poll it with [`JobQueue::get_job`]
/// 3. Call [`JobQueue::shutdown`] to stop the workers
///
/// # Example
///
/// ```rust,ignore
/// let queue = JobQueue::new(QueueConfig::default(), MyProcessor)?;
/// let id = queue.enqueue(params)?;
/// let job = queue.get_job(id)?;
/// queue.shutdown(Duration::from_secs(10)).await?;
/// ```
pub struct JobQueue<P: Processor> {
    config: QueueConfig,
    store: Arc<JobStore<P::Params, P::Output>>,
    sender: mpsc::Sender<Uuid>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    shutdown_started: AtomicBool,
}

impl<P: Processor> JobQueue<P> {
    /// Creates the queue and spawns its workers
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfig`] if `workers` or `capacity` is 0.
    pub fn new(config: QueueConfig, processor: P) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(JobStore::new());
        let (sender, receiver) = mpsc::channel(config.capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let processor = Arc::new(processor);
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();

        for id in 0..config.workers {
            let worker = Worker {
                id,
                store: Arc::clone(&store),
                receiver: Arc::clone(&receiver),
                processor: Arc::clone(&processor),
                shutdown: shutdown.clone(),
            };
            tracker.spawn(worker.run());
        }

        info!(
            workers = config.workers,
            capacity = config.capacity,
            "Job queue started"
        );

        Ok(Self {
            config,
            store,
            sender,
            shutdown,
            tracker,
            shutdown_started: AtomicBool::new(false),
        })
    }

    /// Submits a job and returns its identifier
    ///
    /// Never blocks. When the pending channel is full the job is recorded as
    /// failed with [`QUEUE_FULL_MESSAGE`] and [`QueueError::QueueFull`] is
    /// returned; that record stays in the store but its id is not handed out.
    pub fn enqueue(&self, params: P::Params) -> Result<Uuid> {
        if self.shutdown.is_cancelled() {
            return Err(QueueError::ShutDown);
        }

        let job = Job::new(Uuid::new_v4(), params, Utc::now());
        let job_id = job.id;
        self.store.put(job)?;

        match self.sender.try_send(job_id) {
            Ok(()) => {
                debug!(%job_id, "Job queued");
                Ok(job_id)
            }
            Err(TrySendError::Full(_)) => {
                warn!(%job_id, capacity = self.config.capacity, "Rejecting job, queue is full");
                self.reject(job_id, QUEUE_FULL_MESSAGE);
                Err(QueueError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%job_id, "Rejecting job, queue is shut down");
                self.reject(job_id, "queue is shut down");
                Err(QueueError::ShutDown)
            }
        }
    }

    /// Returns a copy of the job
    pub fn get_job(&self, job_id: Uuid) -> Result<Job<P::Params, P::Output>> {
        self.store
            .get(job_id)
            .ok_or(QueueError::JobNotFound(job_id))
    }

    /// Returns a page of jobs, newest first, optionally filtered by status
    ///
    /// Limits are not capped here; callers normalise them.
    pub fn list_jobs(
        &self,
        status: Option<JobStatus>,
        limit: usize,
        offset: usize,
    ) -> Vec<Job<P::Params, P::Output>> {
        self.store.list(status, limit, offset)
    }

    /// Returns per-status job counts
    pub fn stats(&self) -> JobStats {
        self.store.stats()
    }

    /// Stops the workers
    ///
    /// Workers stop pulling new jobs and the processors' tokens are
    /// cancelled. Jobs already claimed keep running. Waits up to `timeout`
    /// for every worker to exit; on expiry returns
    /// [`QueueError::ShutdownTimeout`] and leaves in-flight work running
    /// detached. Calling it again returns `Ok(())` immediately.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            debug!("Job queue already shut down");
            return Ok(());
        }

        info!("Shutting down job queue");
        self.shutdown.cancel();
        self.tracker.close();

        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => {
                info!("Job queue workers stopped");
                Ok(())
            }
            Err(_) => {
                warn!(?timeout, "Job queue shutdown timed out");
                Err(QueueError::ShutdownTimeout(timeout))
            }
        }
    }

    /// Returns true once shutdown has been signalled
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn worker_count(&self) -> usize {
        self.config.workers
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn reject(&self, job_id: Uuid, message: &str) {
        if let Err(e) = self
            .store
            .update(job_id, |job| job.reject(Utc::now(), message))
        {
            error!(%job_id, error = %e, "Failed to record rejected job");
        }
    }
}
