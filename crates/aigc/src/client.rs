//! Generic JSON call capability for the AIGC service.
//!
//! [`AigcClient`] serializes a request, hands it to an [`AigcTransport`],
//! and deserializes the reply. The transport is object-safe so callers can
//! hold an `AigcClient` without naming the concrete HTTP stack, and tests
//! can substitute a scripted one.
//!
//! The client owns no request-scoped state. It is safe to clone into a
//! detached task that outlives the HTTP request that started it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Errors from the AIGC call layer.
#[derive(Debug, thiserror::Error)]
pub enum AigcError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The AIGC service returned a non-2xx status code.
    #[error("AIGC API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The request payload could not be serialized.
    #[error("failed to encode AIGC request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected shape.
    #[error("failed to decode AIGC response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Moves one JSON request to the AIGC service and returns its JSON reply.
///
/// Implementations must surface non-success statuses as
/// [`AigcError::Api`] rather than returning the error body as a value.
#[async_trait]
pub trait AigcTransport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AigcError>;
}

/// HTTP transport for a single AIGC endpoint, built on [`reqwest`].
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` (e.g. `http://aigc:8888`) with a
    /// per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AigcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport with no per-request timeout. The caller is
    /// expected to bound each call itself.
    pub fn without_timeout(base_url: impl Into<String>) -> Result<Self, AigcError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport reusing an existing [`reqwest::Client`]
    /// (useful for sharing a connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`AigcError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AigcError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AigcError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl AigcTransport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AigcError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Calling AIGC service");

        let response = self.client.request(method, url).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(AigcError::Decode)
    }
}

/// Cheaply cloneable handle for calling the AIGC service.
#[derive(Clone)]
pub struct AigcClient {
    transport: Arc<dyn AigcTransport>,
}

impl AigcClient {
    pub fn new(transport: Arc<dyn AigcTransport>) -> Self {
        Self { transport }
    }

    /// Client over [`HttpTransport`].
    pub fn http(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AigcError> {
        Ok(Self::new(Arc::new(HttpTransport::new(base_url, timeout)?)))
    }

    /// Client over an [`HttpTransport`] without a per-request timeout.
    pub fn http_without_timeout(base_url: impl Into<String>) -> Result<Self, AigcError> {
        Ok(Self::new(Arc::new(HttpTransport::without_timeout(base_url)?)))
    }

    /// Call `path` with `request` as the JSON body and decode the reply.
    pub async fn call<Req, Resp>(
        &self,
        method: Method,
        path: &str,
        request: &Req,
    ) -> Result<Resp, AigcError>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_value(request).map_err(AigcError::Encode)?;
        let reply = self.transport.send(method, path, body).await?;
        serde_json::from_value(reply).map_err(AigcError::Decode)
    }
}
