//! Worker loop
//!
//! Each worker waits on the shared pending channel and runs the processor
//! for every job id it receives. Store mutations happen under the store's
//! lock; the processor itself runs outside it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::job::JobResult;
use crate::processor::Processor;
use crate::store::JobStore;

/// Receiving half of the pending channel, shared by all workers
pub(crate) type JobReceiver = Arc<Mutex<mpsc::Receiver<Uuid>>>;

pub(crate) struct Worker<P: Processor> {
    /// Index used for log fields only
    pub(crate) id: usize,
    pub(crate) store: Arc<JobStore<P::Params, P::Output>>,
    pub(crate) receiver: JobReceiver,
    pub(crate) processor: Arc<P>,
    pub(crate) shutdown: CancellationToken,
}

impl<P: Processor> Worker<P> {
    /// Runs until shutdown is signalled or the channel is closed
    pub(crate) async fn run(self) {
        debug!(worker = self.id, "Worker starting");

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(worker = self.id, "Worker received shutdown signal");
                    break;
                }
                job_id = next_job(&self.receiver) => job_id,
            };

            match next {
                Some(job_id) => self.process_job(job_id).await,
                None => {
                    debug!(worker = self.id, "Pending channel closed");
                    break;
                }
            }
        }

        debug!(worker = self.id, "Worker shutting down");
    }

    async fn process_job(&self, job_id: Uuid) {
        let started = Instant::now();

        let job = match self.store.update(job_id, |job| {
            job.start(Utc::now())?;
            Ok(job.clone())
        }) {
            Ok(job) => job,
            Err(e) => {
                warn!(worker = self.id, %job_id, error = %e, "Skipping job");
                return;
            }
        };

        info!(worker = self.id, %job_id, "Processing job");

        let outcome = AssertUnwindSafe(self.processor.process(self.shutdown.child_token(), job))
            .catch_unwind()
            .await;

        let processing_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let completed_at = Utc::now();

        let update = match outcome {
            Ok(Ok(output)) => {
                info!(worker = self.id, %job_id, processing_time_ms, "Job completed");
                self.store.update(job_id, |job| {
                    job.complete(
                        completed_at,
                        JobResult {
                            output,
                            processing_time_ms,
                        },
                    )
                })
            }
            Ok(Err(err)) => {
                let message = format!("{:#}", err);
                warn!(worker = self.id, %job_id, error = %message, "Job failed");
                self.store.update(job_id, |job| job.fail(completed_at, message))
            }
            Err(panic) => {
                let message = format!("processor panicked: {}", panic_message(panic.as_ref()));
                error!(worker = self.id, %job_id, error = %message, "Job failed");
                self.store.update(job_id, |job| job.fail(completed_at, message))
            }
        };

        if let Err(e) = update {
            error!(worker = self.id, %job_id, error = %e, "Failed to record job outcome");
        }
    }
}

async fn next_job(receiver: &JobReceiver) -> Option<Uuid> {
    receiver.lock().await.recv().await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
