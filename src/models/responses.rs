//! Response DTOs for the cleanup service
//!
//! Defines the outcome of a cleanup pass and the health check body.

use serde::Serialize;

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Records in the snapshot
    pub scanned: usize,
    /// Stale records whose deletion completed
    pub deleted: usize,
    /// Stale records whose deletion failed
    pub failed: usize,
}

impl CleanupReport {
    /// Plain-text body returned to the caller.
    pub fn message(&self) -> String {
        format!("Deleted {} old pending users.", self.deleted)
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
