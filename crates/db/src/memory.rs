//! In-process [`JobStore`] with the same semantics as [`PgJobStore`](crate::PgJobStore).
//!
//! Used when no `DATABASE_URL` is configured and by tests. Jobs live only
//! as long as the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use spx_core::types::JobId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::aigc_job::{AigcJob, NewAigcJob};
use crate::store::JobStore;

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, AigcJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs created so far.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self, new: NewAigcJob) -> Result<AigcJob, StoreError> {
        let now = Utc::now();
        let job = AigcJob {
            id: JobId::new(uuid::Uuid::new_v4().to_string()),
            asset_type: new.asset_type,
            result_url: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn update_job_result(
        &self,
        id: &JobId,
        result_url: &str,
    ) -> Result<AigcJob, StoreError> {
        if result_url.is_empty() {
            return Err(StoreError::EmptyResult(id.clone()));
        }
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if !job.result_url.is_empty() {
            return Err(StoreError::AlreadyFinished(id.clone()));
        }
        job.result_url = result_url.to_string();
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn get_job(&self, id: &JobId) -> Result<AigcJob, StoreError> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
