#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method as HttpMethod, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use spx_aigc::api::{ANIMATE_PATH, EMBEDDING_PATH, GENERATE_PATH, MATTING_PATH};
use spx_aigc::{AigcClient, AigcError, AigcTransport, Method};
use spx_api::config::{AigcConfig, ServerConfig};
use spx_api::router::build_app_router;
use spx_api::state::{AigcClients, AppState};
use spx_core::url_safety::HostResolver;
use spx_db::MemoryJobStore;
use tokio::sync::Semaphore;
use tower::ServiceExt;

/// Image URL the stub `/generate` returns.
pub const GENERATED_URL: &str = "https://cdn/x.png";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        aigc: AigcConfig {
            endpoint: "http://aigc.test".to_string(),
            request_timeout_secs: 5,
            job_timeout_secs: 5,
        },
    }
}

// ---------------------------------------------------------------------------
// AIGC service stub
// ---------------------------------------------------------------------------

/// In-process AIGC service.
///
/// `/generate` blocks until [`StubTransport::release_generate`] hands out a
/// permit, so tests can observe a job before it finishes.
pub struct StubTransport {
    generate_gate: Semaphore,
    failing: Mutex<Vec<&'static str>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl StubTransport {
    fn new() -> Self {
        Self {
            generate_gate: Semaphore::new(0),
            failing: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Let `n` pending or future `/generate` calls complete.
    pub fn release_generate(&self, n: usize) {
        self.generate_gate.add_permits(n);
    }

    /// Make every call to `path` fail with a 503.
    pub fn fail(&self, path: &'static str) {
        self.failing.lock().unwrap().push(path);
    }

    /// Calls received so far, as `(path, body)`.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AigcTransport for StubTransport {
    async fn send(&self, _method: Method, path: &str, body: Value) -> Result<Value, AigcError> {
        self.calls.lock().unwrap().push((path.to_string(), body));

        if path == GENERATE_PATH {
            self.generate_gate.acquire().await.unwrap().forget();
        }

        if self.failing.lock().unwrap().iter().any(|p| *p == path) {
            return Err(AigcError::Api {
                status: 503,
                body: "model busy".to_string(),
            });
        }

        Ok(match path {
            MATTING_PATH => json!({ "image_url": "https://cdn/matted.png" }),
            GENERATE_PATH => json!({ "image_url": GENERATED_URL }),
            ANIMATE_PATH => json!({ "material_url": "https://cdn/sprite.zip" }),
            EMBEDDING_PATH => json!({ "embedding": [0.5, 0.25], "desc": "a cat" }),
            other => json!({ "unexpected": other }),
        })
    }
}

// ---------------------------------------------------------------------------
// DNS stub
// ---------------------------------------------------------------------------

/// Fixed host table. Unknown hosts fail to resolve.
pub struct StaticResolver {
    hosts: HashMap<&'static str, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn standard() -> Self {
        let table: [(&'static str, &[&str]); 3] = [
            ("cdn.example.com", &["93.184.216.34"]),
            ("rebind.example.com", &["93.184.216.34", "10.0.0.7"]),
            ("internal.example.com", &["192.168.1.20"]),
        ];
        let hosts: HashMap<_, Vec<IpAddr>> = table
            .into_iter()
            .map(|(host, ips)| (host, ips.iter().map(|ip| ip.parse().unwrap()).collect()))
            .collect();
        Self { hosts }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts
            .get(host)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// The full router wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryJobStore>,
    pub aigc: Arc<StubTransport>,
}

/// Build the full application router with all middleware layers.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryJobStore::new());
    let aigc = Arc::new(StubTransport::new());

    let state = AppState::new(
        config.clone(),
        store.clone(),
        AigcClients::shared(AigcClient::new(aigc.clone())),
        Arc::new(StaticResolver::standard()),
    );
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        store,
        aigc,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// Used to stand in for the AIGC service when a test needs the real HTTP
/// transport.
pub async fn spawn_aigc_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(HttpMethod::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(HttpMethod::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the job reports `status`, or panic after
/// two seconds. Returns the final `data` payload.
pub async fn wait_for_status(app: &Router, job_id: &str, status: u64) -> Value {
    let uri = format!("/api/v1/aigc/status/{job_id}");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let json = body_json(get(app, &uri).await).await;
        if json["data"]["status"] == status {
            return json["data"].clone();
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("job {job_id} never reached status {status}, last report: {json}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
