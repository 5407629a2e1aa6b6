//! AIGC job engine.
//!
//! [`dispatcher`] starts generation jobs in the background; [`status`]
//! answers polls by deriving a job's status from its stored record.

pub mod dispatcher;
pub mod status;

pub use dispatcher::GenerationDispatcher;
pub use status::{resolve_job_status, JobStatusReport};
