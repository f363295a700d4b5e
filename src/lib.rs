//! Pending User Cleanup - HTTP-triggered janitor for stale registrations
//!
//! Removes pending user records that registered more than two minutes ago
//! and reports how many were deleted.

pub mod api;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cleanup::sweep_stale_pending_users;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
