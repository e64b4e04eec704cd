//! Homebound Queue
//!
//! An in-memory job queue with a fixed worker pool.
//!
//! Architecture:
//! - Job: the record of one unit of work and its lifecycle
//! - Store: lock-protected table of every job ever submitted
//! - Processor: caller-supplied capability that performs the work
//! - Workers: N tasks pulling job ids from a bounded channel
//! - Queue: submit, look up, list, stats and shutdown
//!
//! Jobs live only as long as the queue; nothing is persisted.

pub mod error;
pub mod job;
pub mod processor;
pub mod queue;
pub mod store;
mod worker;

// Re-export commonly used types
pub use error::{QueueError, Result};
pub use job::{Job, JobResult, JobStatus, ParseStatusError};
pub use processor::Processor;
pub use queue::{JobQueue, QUEUE_FULL_MESSAGE, QueueConfig};
pub use store::{JobStats, JobStore};
pub use tokio_util::sync::CancellationToken;
