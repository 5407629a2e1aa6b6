//! Client for the remote AIGC compute service.
//!
//! [`client`] holds the generic JSON call capability and its HTTP
//! transport; [`api`] layers the typed matting, generation, animation and
//! embedding operations on top of it.

pub mod api;
pub mod client;

pub use client::{AigcClient, AigcError, AigcTransport, HttpTransport};
pub use reqwest::Method;
