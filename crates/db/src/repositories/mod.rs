//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. [`PgJobStore`] adapts
//! them to the [`JobStore`](crate::JobStore) trait.

pub mod aigc_job_repo;

pub use aigc_job_repo::{AigcJobRepo, PgJobStore};
