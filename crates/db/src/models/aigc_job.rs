//! AIGC job entity and its row mapping.

use serde::Serialize;
use sqlx::FromRow;
use spx_core::asset::AssetType;
use spx_core::job_status::AigcJobStatus;
use spx_core::types::{JobId, Timestamp};

use crate::error::StoreError;

/// A stored AIGC job.
#[derive(Debug, Clone, Serialize)]
pub struct AigcJob {
    pub id: JobId,
    pub asset_type: AssetType,
    /// Result marker: empty until the generated artifact is recorded.
    pub result_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AigcJob {
    pub fn status(&self) -> AigcJobStatus {
        AigcJobStatus::from_result_url(&self.result_url)
    }
}

/// Input for creating a job.
#[derive(Debug, Clone, Copy)]
pub struct NewAigcJob {
    pub asset_type: AssetType,
}

/// A row from the `aigc_jobs` table.
#[derive(Debug, FromRow)]
pub struct AigcJobRow {
    pub id: i64,
    pub asset_type: i16,
    pub result_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<AigcJobRow> for AigcJob {
    type Error = StoreError;

    fn try_from(row: AigcJobRow) -> Result<Self, Self::Error> {
        let asset_type = AssetType::from_id(row.asset_type).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "job {} has unknown asset_type {}",
                row.id, row.asset_type
            ))
        })?;
        Ok(Self {
            id: JobId::new(row.id.to_string()),
            asset_type,
            result_url: row.result_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
