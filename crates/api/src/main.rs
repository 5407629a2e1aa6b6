use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use spx_api::config::ServerConfig;
use spx_api::router::build_app_router;
use spx_api::state::{AigcClients, AppState};
use spx_core::url_safety::SystemResolver;
use spx_db::{JobStore, MemoryJobStore, PgJobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spx_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Job store ---
    let store: Arc<dyn JobStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = spx_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            spx_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            spx_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgJobStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, AIGC jobs are kept in memory and lost on restart");
            Arc::new(MemoryJobStore::new())
        }
    };

    // --- AIGC clients ---
    let clients = AigcClients::from_config(&config.aigc).expect("Failed to build AIGC HTTP client");
    tracing::info!(
        endpoint = %config.aigc.endpoint,
        request_timeout_secs = config.aigc.request_timeout_secs,
        job_timeout_secs = config.aigc.job_timeout_secs,
        "AIGC clients configured",
    );

    // --- App state ---
    let state = AppState::new(config.clone(), store, clients, Arc::new(SystemResolver));
    let dispatcher = Arc::clone(&state.dispatcher);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    let in_flight = dispatcher.in_flight();
    tracing::info!(in_flight, "Server stopped accepting connections, draining generation jobs");

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if dispatcher.shutdown(grace).await {
        tracing::info!("Generation jobs drained");
    } else {
        tracing::warn!(
            remaining = dispatcher.in_flight(),
            "Generation jobs still running after shutdown timeout, abandoning them",
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
