//! Domain types and pure logic for the AIGC gateway.
//!
//! Everything here is independent of HTTP, persistence and the remote
//! compute service: asset classification, job status derivation, and the
//! outbound URL safety check.

pub mod asset;
pub mod error;
pub mod generation;
pub mod job_status;
pub mod types;
pub mod url_safety;
