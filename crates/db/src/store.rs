use async_trait::async_trait;
use spx_core::types::JobId;

use crate::error::StoreError;
use crate::models::aigc_job::{AigcJob, NewAigcJob};

/// Durable storage for AIGC jobs.
///
/// Implementations must give read-after-write consistency per job: a
/// [`get_job`](Self::get_job) issued after [`update_job_result`](Self::update_job_result)
/// returned must observe the new result.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job with an empty result marker.
    async fn create_job(&self, new: NewAigcJob) -> Result<AigcJob, StoreError>;

    /// Record the job's result.
    ///
    /// Fails with [`StoreError::NotFound`] if the job does not exist and with
    /// [`StoreError::AlreadyFinished`] if a result was already recorded.
    async fn update_job_result(&self, id: &JobId, result_url: &str)
        -> Result<AigcJob, StoreError>;

    /// Fetch a job. Fails with [`StoreError::NotFound`] if absent.
    async fn get_job(&self, id: &JobId) -> Result<AigcJob, StoreError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
