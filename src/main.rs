//! Pending User Cleanup - HTTP-triggered janitor for stale registrations
//!
//! Serves the cleanup endpoint over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pending_user_cleanup::config::{Config, StoreBackend};
use pending_user_cleanup::store::{DocumentStore, FirestoreStore, InMemoryDocumentStore};
use pending_user_cleanup::{create_router, spawn_cleanup_task, AppState};

/// Main entry point for the cleanup service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the document store client once for the whole process
/// 4. Start the periodic cleanup task if an interval is configured
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pending_user_cleanup=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pending User Cleanup service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, port={}, cleanup_interval={}s",
        config.store_backend, config.server_port, config.cleanup_interval
    );

    let store = build_store(&config)?;
    let state = AppState::from_shared(store.clone());

    let cleanup_handle = if config.cleanup_interval > 0 {
        Some(spawn_cleanup_task(store, config.cleanup_interval))
    } else {
        info!("Periodic cleanup disabled, passes run on request only");
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Constructs the document store client selected by configuration.
fn build_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using in-memory document store, records do not outlive the process");
            let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
            Ok(store)
        }
        StoreBackend::Firestore => {
            let firestore = config
                .firestore()
                .context("FIRESTORE_PROJECT_ID must be set for the firestore backend")?;
            info!(
                "Using Firestore project '{}' database '{}' at {}",
                firestore.project_id, firestore.database, firestore.base_url
            );
            let store: Arc<dyn DocumentStore> = Arc::new(FirestoreStore::new(firestore)?);
            Ok(store)
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the periodic cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
