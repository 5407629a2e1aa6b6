//! Asynchronous generation dispatcher.
//!
//! [`GenerationDispatcher::dispatch`] creates the job record on the caller's
//! task, then hands the AIGC call to a detached Tokio task and returns the
//! job ID without waiting. The detached task is not tied to the request:
//! dropping the request future does not cancel it, and nothing ever joins it.
//! Its only effect is the result write on the job record.
//!
//! Failures in the detached task (transport error, timeout, empty result,
//! store write) are logged and otherwise dropped. The job keeps an empty
//! result marker and reports `Generating` indefinitely. There is no retry.

use std::sync::Arc;
use std::time::Duration;

use spx_aigc::api::GenerateInput;
use spx_aigc::AigcClient;
use spx_core::generation::GenerationRequest;
use spx_core::types::JobId;
use spx_db::models::aigc_job::NewAigcJob;
use spx_db::{JobStore, StoreError};
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Dispatches generation requests to the AIGC service in the background.
pub struct GenerationDispatcher {
    store: Arc<dyn JobStore>,
    aigc: AigcClient,
    /// Tracks detached jobs so shutdown can drain them.
    tasks: TaskTracker,
    job_timeout: Duration,
}

impl GenerationDispatcher {
    pub fn new(store: Arc<dyn JobStore>, aigc: AigcClient, job_timeout: Duration) -> Self {
        Self {
            store,
            aigc,
            tasks: TaskTracker::new(),
            job_timeout,
        }
    }

    /// Create a job for `request` and start generating it in the background.
    ///
    /// The returned ID names a record that already exists in the store. If
    /// the record cannot be created, no background work is started.
    pub async fn dispatch(&self, request: GenerationRequest) -> Result<JobId, StoreError> {
        let asset_type = request.asset_type();
        let job = self.store.create_job(NewAigcJob { asset_type }).await?;

        tracing::info!(
            job_id = %job.id,
            asset_type = asset_type.label(),
            "AIGC generation job created",
        );

        let span = tracing::info_span!("aigc_generation", job_id = %job.id);
        self.tasks.spawn(
            run_generation(
                Arc::clone(&self.store),
                self.aigc.clone(),
                job.id.clone(),
                request,
                self.job_timeout,
            )
            .instrument(span),
        );

        Ok(job.id)
    }

    /// Number of background jobs still running.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Close the tracker and wait up to `grace` for running jobs to
    /// finish. Returns `true` if all of them did.
    ///
    /// Jobs still running when `grace` elapses are abandoned with the
    /// runtime; their records stay `Generating`.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tasks.close();
        tokio::time::timeout(grace, self.tasks.wait()).await.is_ok()
    }
}

/// Body of the detached task: call the AIGC service, record the result.
async fn run_generation(
    store: Arc<dyn JobStore>,
    aigc: AigcClient,
    job_id: JobId,
    request: GenerationRequest,
    job_timeout: Duration,
) {
    let input = GenerateInput {
        category: request.category_label(),
        prompt: request.keyword().to_string(),
    };

    let output = match tokio::time::timeout(job_timeout, aigc.generate(&input)).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "AIGC generate call failed, job left generating");
            return;
        }
        Err(_) => {
            tracing::error!(
                timeout_secs = job_timeout.as_secs(),
                "AIGC generate call timed out, job left generating",
            );
            return;
        }
    };

    if output.image_url.is_empty() {
        tracing::warn!("AIGC generate returned no image_url, job left generating");
        return;
    }

    match store.update_job_result(&job_id, &output.image_url).await {
        Ok(_) => {
            tracing::info!(image_url = %output.image_url, "AIGC generation job finished");
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                image_url = %output.image_url,
                "Failed to record AIGC result, job left generating",
            );
        }
    }
}
