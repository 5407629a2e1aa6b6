use spx_core::types::JobId;

/// Errors returned by [`JobStore`](crate::JobStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No job with this ID exists.
    #[error("AIGC job {0} not found")]
    NotFound(JobId),

    /// The job already carries a result; results are written once.
    #[error("AIGC job {0} already has a result")]
    AlreadyFinished(JobId),

    /// An empty result was offered; it would not change the job's status.
    #[error("empty result for AIGC job {0}")]
    EmptyResult(JobId),

    /// A stored row could not be mapped back to a job.
    #[error("corrupt AIGC job row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
