//! Task dispatch client.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, Span};

use inbox_core::{logging, new_v7, BatchHandle, Error, JobRepository, Result, RunHandle, TeamScope};

use crate::task::Task;

/// Submits typed task batches to the job queue.
#[derive(Clone)]
pub struct TaskClient {
    jobs: Arc<dyn JobRepository>,
}

impl TaskClient {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    /// Enqueue one run of `T` per payload, as a single batch.
    ///
    /// Returns on acceptance, not completion. An empty `payloads` returns an
    /// empty handle without touching the queue. Enqueue failures propagate
    /// unchanged; nothing is retried.
    #[instrument(
        skip(self, scope, payloads),
        fields(
            subsystem = "jobs",
            component = "task_client",
            op = "batch_trigger",
            task_id = T::ID,
            team_id = %scope.team_id,
            batch_id = tracing::field::Empty,
            item_count = tracing::field::Empty,
        )
    )]
    pub async fn batch_trigger<T: Task>(
        &self,
        scope: &TeamScope,
        payloads: Vec<T::Payload>,
    ) -> Result<BatchHandle> {
        let batch_id = new_v7();
        let span = Span::current();
        span.record(logging::BATCH_ID, tracing::field::display(batch_id));
        span.record(logging::ITEM_COUNT, payloads.len() as u64);
        if payloads.is_empty() {
            info!("Empty batch, nothing enqueued");
            return Ok(BatchHandle::empty(batch_id));
        }

        let start = Instant::now();
        let values = payloads
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)?;

        let ids = self
            .jobs
            .enqueue_batch(batch_id, T::ID, scope.team_id, values)
            .await
            .map_err(|e| {
                error!(error = %e, "Batch enqueue failed");
                e
            })?;

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch enqueued"
        );

        Ok(BatchHandle {
            batch_id,
            runs: ids.into_iter().map(|id| RunHandle { id }).collect(),
        })
    }
}
