//! Processor capability
//!
//! The queue never knows what a job does; the work itself is supplied once,
//! at construction, as an implementation of [`Processor`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::job::Job;

/// Performs the work of a job
///
/// Workers call `process` concurrently for different jobs, so
/// implementations must be safe to share. The token is cancelled when the
/// queue shuts down; honoring it is up to the implementation.
#[async_trait]
pub trait Processor: Send + Sync + 'static {
    /// Caller-supplied job parameters
    type Params: Clone + Send + Sync + 'static;

    /// Value produced by a successful run
    type Output: Clone + Send + Sync + 'static;

    /// Executes one job
    ///
    /// # Arguments
    /// * `cancel` - Cancelled when the queue begins shutting down
    /// * `job` - Snapshot of the job as it was when claimed
    ///
    /// # Returns
    /// The output on success; an error fails the job with the error's
    /// message chain.
    async fn process(
        &self,
        cancel: CancellationToken,
        job: Job<Self::Params, Self::Output>,
    ) -> anyhow::Result<Self::Output>;
}
