//! Offline Cache - A persistent local store for map tiles and unsynced edits
//!
//! Serves the cache over HTTP to local clients.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_cache::api::create_router;
use offline_cache::{AppState, Config, FileEngine, OfflineCache};

/// Main entry point for the offline cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache on a file-backed engine
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Close the cache after graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offline Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: db_name={}, db_version={}, data_dir={}, port={}",
        config.db_name,
        config.db_version,
        config.data_dir.display(),
        config.server_port
    );

    let engine = FileEngine::new(config.data_dir.clone());
    let mut cache = OfflineCache::new(engine, config.db_name.clone(), Some(config.db_version));
    cache
        .open()
        .await
        .with_context(|| format!("Failed to open cache '{}'", config.db_name))?;

    let state = AppState::new(cache);
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!("Server error: {}", e);
    }

    // The router and its clones are gone once serve returns
    match Arc::try_unwrap(state.cache) {
        Ok(mut cache) => cache.close().await.context("Failed to close cache")?,
        Err(_) => warn!("Cache still in use at shutdown, leaving it open"),
    }

    info!("Server shutdown complete");
    served.context("Server terminated abnormally")
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
