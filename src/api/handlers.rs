//! API Handlers
//!
//! HTTP request handlers for the cleanup trigger and health check.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::cleanup::sweep_stale_pending_users;
use crate::error::Result;
use crate::models::HealthResponse;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Holds the process-wide document store client, built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Shared document store client
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Creates a new AppState owning the given store.
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a new AppState around an already shared store.
    pub fn from_shared(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

/// Handler for any request to `/`
///
/// Runs one cleanup pass and reports how many pending users were removed.
/// Method, headers and body are ignored.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<String> {
    let report = sweep_stale_pending_users(state.store.as_ref(), Utc::now()).await?;

    Ok(report.message())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
