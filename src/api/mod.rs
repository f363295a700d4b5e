//! API Module
//!
//! HTTP handlers and routing for the cleanup service.
//!
//! # Endpoints
//! - `ANY /` - Remove stale pending users and report the count
//! - `ANY /cleanUpPendingUsers` - Alias of `/`
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
