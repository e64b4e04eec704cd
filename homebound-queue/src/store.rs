//! Job store
//!
//! The authoritative in-memory table of every job submitted to one queue.
//! A single read-write lock guards the table; every read returns owned
//! clones taken while the lock is held, so callers never alias live records.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::job::{Job, JobStatus};

/// Snapshot of job counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub total: usize,
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobStats {
    /// Number of jobs currently in `status`
    pub fn count(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Queued => self.queued,
            JobStatus::Processing => self.processing,
            JobStatus::Completed => self.completed,
            JobStatus::Failed => self.failed,
        }
    }

    /// Counts keyed by status name, plus `"total"`
    pub fn as_map(&self) -> BTreeMap<&'static str, usize> {
        let mut map: BTreeMap<&'static str, usize> = JobStatus::ALL
            .into_iter()
            .map(|status| (status.as_str(), self.count(status)))
            .collect();
        map.insert("total", self.total);
        map
    }

    fn record(&mut self, status: JobStatus) {
        self.total += 1;
        match status {
            JobStatus::Queued => self.queued += 1,
            JobStatus::Processing => self.processing += 1,
            JobStatus::Completed => self.completed += 1,
            JobStatus::Failed => self.failed += 1,
        }
    }
}

struct Table<P, R> {
    jobs: HashMap<Uuid, Job<P, R>>,
    /// Insertion order, oldest first
    order: Vec<Uuid>,
}

/// Thread-safe mapping from job identifier to job record
pub struct JobStore<P, R> {
    table: RwLock<Table<P, R>>,
}

impl<P, R> Default for JobStore<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> JobStore<P, R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                jobs: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Inserts a new record
    pub fn put(&self, job: Job<P, R>) -> Result<()> {
        let mut table = self.table.write();
        if table.jobs.contains_key(&job.id) {
            return Err(QueueError::DuplicateJob(job.id));
        }
        table.order.push(job.id);
        table.jobs.insert(job.id, job);
        Ok(())
    }

    /// Mutates one record under the write lock
    ///
    /// The closure's error is returned unchanged; the record keeps whatever
    /// state the closure left it in.
    pub fn update<T, F>(&self, id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut Job<P, R>) -> Result<T>,
    {
        let mut table = self.table.write();
        let job = table.jobs.get_mut(&id).ok_or(QueueError::JobNotFound(id))?;
        f(job)
    }

    pub fn len(&self) -> usize {
        self.table.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts jobs per status
    ///
    /// Consistent with itself, not with mutations racing the call.
    pub fn stats(&self) -> JobStats {
        let table = self.table.read();
        let mut stats = JobStats::default();
        for job in table.jobs.values() {
            stats.record(job.status);
        }
        stats
    }
}

impl<P: Clone, R: Clone> JobStore<P, R> {
    /// Returns a copy of the record
    pub fn get(&self, id: Uuid) -> Option<Job<P, R>> {
        self.table.read().jobs.get(&id).cloned()
    }

    /// Returns a page of jobs, newest first
    ///
    /// `filter` of `None` matches every job. An `offset` past the end or a
    /// `limit` of zero yields an empty page. No upper bound is applied here.
    pub fn list(&self, filter: Option<JobStatus>, limit: usize, offset: usize) -> Vec<Job<P, R>> {
        let table = self.table.read();
        table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.jobs.get(id))
            .filter(|job| filter.is_none_or(|status| job.status == status))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}
