use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::{sleep, timeout};

use crate::errors::{WorkerError, WorkerResult};
use crate::messages::Message;
use crate::models::Task;
use crate::services::{
    AlertKind, AlertSink, ArtifactStore, ImageTransform, Ledger, ResultDelivery, TaskQueue,
};

/// The consumer side of the pipeline: pops one task at a time, runs the
/// transform, and settles the ledger for whatever happened.
///
/// Scaling out means running more `Worker` instances against the same
/// channel; each task is delivered to exactly one of them.
pub struct Worker {
    ledger: Ledger,
    queue: Arc<dyn TaskQueue>,
    storage: Arc<dyn ArtifactStore>,
    transform: Arc<dyn ImageTransform>,
    delivery: Arc<dyn ResultDelivery>,
    alerts: Arc<dyn AlertSink>,
    task_deadline: Duration,
}

impl Worker {
    pub fn new(
        ledger: Ledger,
        queue: Arc<dyn TaskQueue>,
        storage: Arc<dyn ArtifactStore>,
        transform: Arc<dyn ImageTransform>,
        delivery: Arc<dyn ResultDelivery>,
        alerts: Arc<dyn AlertSink>,
        task_deadline: Duration,
    ) -> Self {
        Self {
            ledger,
            queue,
            storage,
            transform,
            delivery,
            alerts,
            task_deadline,
        }
    }

    /// Endless consumer loop: idle on a blocking pop, handle one task to
    /// completion, acknowledge, go idle again. Never returns; the process is
    /// restarted externally on crash.
    pub async fn run(&self) {
        tracing::info!("Worker started");
        loop {
            self.step().await;
        }
    }

    /// Wait for one task and handle it to completion, including any
    /// compensation, alerting, and the queue acknowledgement.
    pub async fn step(&self) {
        match self.queue.pop().await {
            Some(popped) => {
                tracing::debug!(
                    "Processing task {} for user {}",
                    popped.task.task_id,
                    popped.task.user_id
                );

                if let Err(e) = self.handle_task(&popped.task).await {
                    // Per-task failures must not die silently, and must not
                    // take the loop down either.
                    tracing::error!("Task {} failed: {}", popped.task.task_id, e);
                    self.alerts
                        .alert(
                            AlertKind::WorkerCrash,
                            &e.to_string(),
                            &format!("task: {:?}", popped.task),
                        )
                        .await;
                }

                // Handled tasks are never re-enqueued, failed or not; ack
                // unconditionally once the outcome is settled.
                self.queue.ack(&popped).await;
            }
            None => {
                // pop blocks while the queue is merely empty, so None means
                // a transport failure; back off before reconnecting.
                sleep(Duration::from_secs(1)).await;
            }
        }
    }

    async fn handle_task(&self, task: &Task) -> WorkerResult<()> {
        match self.run_transform(task).await {
            Ok(result_bytes) => {
                let result_reference = self
                    .storage
                    .store(&result_name(&task.source_reference), &result_bytes)
                    .await?;
                self.ledger
                    .record_history(task.user_id, &task.source_reference, &result_reference)
                    .await?;
                tracing::info!(
                    "Task {} completed, result at {}",
                    task.task_id,
                    result_reference
                );

                // The work is done and recorded; a failed hand-off is an
                // operational problem, not a billing one. No refund here.
                if let Err(e) = self
                    .delivery
                    .deliver(
                        task.user_id,
                        Bytes::from(result_bytes),
                        &Message::ProcessingComplete.text(),
                    )
                    .await
                {
                    tracing::error!("Delivery to user {} failed: {}", task.user_id, e);
                    self.alerts
                        .alert(
                            AlertKind::SendError,
                            &e.to_string(),
                            &format!("user_id: {}", task.user_id),
                        )
                        .await;
                }
            }
            Err(e) => {
                tracing::error!("Transform for task {} failed: {}", task.task_id, e);
                self.refund(task.user_id).await?;
                self.alerts
                    .alert(
                        AlertKind::ProcessingError,
                        &format!("File: {}", task.source_reference),
                        &format!("user_id: {}", task.user_id),
                    )
                    .await;
            }
        }

        Ok(())
    }

    async fn run_transform(&self, task: &Task) -> WorkerResult<Vec<u8>> {
        let source = self
            .storage
            .load(&task.source_reference)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    WorkerError::SourceMissing(task.source_reference.clone())
                } else {
                    WorkerError::Io(e)
                }
            })?;

        // The transform is CPU-bound; run it off the async threads, bounded
        // by the per-task deadline so a stuck transform cannot wedge the
        // loop indefinitely.
        let transform = Arc::clone(&self.transform);
        let result = timeout(
            self.task_deadline,
            tokio::task::spawn_blocking(move || transform.apply(&source)),
        )
        .await;

        match result {
            Ok(Ok(Ok(bytes))) => Ok(bytes),
            Ok(Ok(Err(e))) => Err(WorkerError::Transform(e.to_string())),
            Ok(Err(join_error)) => Err(WorkerError::TaskPanic(join_error.to_string())),
            Err(_elapsed) => Err(WorkerError::Timeout(self.task_deadline.as_secs())),
        }
    }

    // Compensating action: give back the credit spent on a task whose work
    // never completed. total_processed stays as it is.
    async fn refund(&self, user_id: i64) -> WorkerResult<()> {
        match self.ledger.adjust_balance(user_id, 1, false).await? {
            Some(new_balance) => {
                tracing::info!(
                    "Refunded one credit to user {} (balance now {})",
                    user_id,
                    new_balance
                );
                Ok(())
            }
            None => Err(WorkerError::MissingAccount(user_id)),
        }
    }
}

// Results sit next to their sources: same stem, a `_processed` marker, and a
// short uuid so reprocessing never overwrites an earlier result.
fn result_name(source_reference: &str) -> String {
    let path = Path::new(source_reference);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("result");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_processed_{}{}", stem, &suffix[..8], ext)
}
