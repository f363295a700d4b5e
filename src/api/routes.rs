//! API Routes
//!
//! Configures the Axum router for the cleanup service.

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{cleanup_handler, health_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `ANY /` - Run a cleanup pass
/// - `ANY /cleanUpPendingUsers` - Same, under the function's deployed name
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin so schedulers and consoles can trigger a pass
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", any(cleanup_handler))
        .route("/cleanUpPendingUsers", any(cleanup_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
