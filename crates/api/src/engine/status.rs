//! Job status resolution for polling clients.
//!
//! Reads only. Safe to call any number of times from any number of
//! callers; the report is derived entirely from the stored job.

use serde::Serialize;
use spx_core::asset::AssetType;
use spx_core::job_status::AigcJobStatus;
use spx_core::types::JobId;
use spx_db::models::aigc_job::AigcJob;
use spx_db::JobStore;

use crate::error::AppResult;

/// Poll response: `{status, result: {jobId, type, files}}`.
#[derive(Debug, Serialize)]
pub struct JobStatusReport {
    pub status: AigcJobStatus,
    pub result: JobStatusDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusDetails {
    pub job_id: JobId,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub files: JobFiles,
}

/// Produced artifacts. Empty strings until produced.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFiles {
    pub image_url: String,
    /// Reserved for skeleton output; no job produces one yet.
    pub skeleton_url: String,
}

impl From<AigcJob> for JobStatusReport {
    fn from(job: AigcJob) -> Self {
        let status = job.status();
        Self {
            status,
            result: JobStatusDetails {
                job_id: job.id,
                asset_type: job.asset_type,
                files: JobFiles {
                    image_url: job.result_url,
                    skeleton_url: String::new(),
                },
            },
        }
    }
}

/// Look up a job and report its current status.
///
/// An unknown ID fails with `CoreError::NotFound`.
pub async fn resolve_job_status(store: &dyn JobStore, job_id: &JobId) -> AppResult<JobStatusReport> {
    let job = store.get_job(job_id).await?;
    Ok(JobStatusReport::from(job))
}
