use std::sync::Arc;
use std::time::Duration;

use spx_aigc::{AigcClient, AigcError};
use spx_core::url_safety::HostResolver;
use spx_db::JobStore;

use crate::config::{AigcConfig, ServerConfig};
use crate::engine::GenerationDispatcher;

/// AIGC clients for the two call modes.
///
/// Synchronous calls run inside an HTTP request and are bounded by the
/// transport timeout. Background generation is bounded only by the job
/// timeout the dispatcher applies, so its transport has none.
#[derive(Clone)]
pub struct AigcClients {
    pub sync: AigcClient,
    pub generation: AigcClient,
}

impl AigcClients {
    /// HTTP clients for the configured endpoint.
    pub fn from_config(config: &AigcConfig) -> Result<Self, AigcError> {
        Ok(Self {
            sync: AigcClient::http(
                config.endpoint.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?,
            generation: AigcClient::http_without_timeout(config.endpoint.clone())?,
        })
    }

    /// Use one client for both modes.
    pub fn shared(client: AigcClient) -> Self {
        Self {
            sync: client.clone(),
            generation: client,
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// AIGC job records (PostgreSQL or in-memory).
    pub store: Arc<dyn JobStore>,
    /// Client for synchronous AIGC calls.
    pub aigc: AigcClient,
    /// Resolves hosts of client-supplied URLs before they are forwarded.
    pub resolver: Arc<dyn HostResolver>,
    /// Starts background generation jobs.
    pub dispatcher: Arc<GenerationDispatcher>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn JobStore>,
        clients: AigcClients,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        let dispatcher = GenerationDispatcher::new(
            Arc::clone(&store),
            clients.generation,
            Duration::from_secs(config.aigc.job_timeout_secs),
        );
        Self {
            config: Arc::new(config),
            store,
            aigc: clients.sync,
            resolver,
            dispatcher: Arc::new(dispatcher),
        }
    }
}
