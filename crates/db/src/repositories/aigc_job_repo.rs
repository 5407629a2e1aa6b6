//! Repository for the `aigc_jobs` table.
//!
//! `result_url` is write-once: the update only matches rows whose marker is
//! still empty, so a finished job can never be overwritten or reset.

use async_trait::async_trait;
use sqlx::PgPool;
use spx_core::types::JobId;

use crate::error::StoreError;
use crate::models::aigc_job::{AigcJob, AigcJobRow, NewAigcJob};
use crate::store::JobStore;

/// Column list for `aigc_jobs` queries.
const COLUMNS: &str = "id, asset_type, result_url, created_at, updated_at";

/// Provides CRUD operations for AIGC jobs.
pub struct AigcJobRepo;

impl AigcJobRepo {
    /// Insert a new job with an empty result marker.
    pub async fn create(pool: &PgPool, input: NewAigcJob) -> Result<AigcJobRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO aigc_jobs (asset_type) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AigcJobRow>(&query)
            .bind(input.asset_type.id())
            .fetch_one(pool)
            .await
    }

    /// Find a job by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<AigcJobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM aigc_jobs WHERE id = $1");
        sqlx::query_as::<_, AigcJobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the result marker if it is still empty.
    ///
    /// Returns `None` when no row matched, either because the job does not
    /// exist or because it already has a result.
    pub async fn set_result_if_empty(
        pool: &PgPool,
        id: i64,
        result_url: &str,
    ) -> Result<Option<AigcJobRow>, sqlx::Error> {
        let query = format!(
            "UPDATE aigc_jobs SET result_url = $2, updated_at = NOW() \
             WHERE id = $1 AND result_url = '' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AigcJobRow>(&query)
            .bind(id)
            .bind(result_url)
            .fetch_optional(pool)
            .await
    }
}

/// [`JobStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Job IDs handed out by this store are decimal primary keys. Anything
/// else cannot name a row.
fn parse_id(id: &JobId) -> Result<i64, StoreError> {
    id.as_str()
        .parse()
        .map_err(|_| StoreError::NotFound(id.clone()))
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create_job(&self, new: NewAigcJob) -> Result<AigcJob, StoreError> {
        let row = AigcJobRepo::create(&self.pool, new).await?;
        AigcJob::try_from(row)
    }

    async fn update_job_result(
        &self,
        id: &JobId,
        result_url: &str,
    ) -> Result<AigcJob, StoreError> {
        if result_url.is_empty() {
            return Err(StoreError::EmptyResult(id.clone()));
        }
        let pk = parse_id(id)?;
        match AigcJobRepo::set_result_if_empty(&self.pool, pk, result_url).await? {
            Some(row) => AigcJob::try_from(row),
            None => match AigcJobRepo::find_by_id(&self.pool, pk).await? {
                Some(_) => Err(StoreError::AlreadyFinished(id.clone())),
                None => Err(StoreError::NotFound(id.clone())),
            },
        }
    }

    async fn get_job(&self, id: &JobId) -> Result<AigcJob, StoreError> {
        let pk = parse_id(id)?;
        let row = AigcJobRepo::find_by_id(&self.pool, pk)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        AigcJob::try_from(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
