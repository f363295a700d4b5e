//! Response models for the cleanup service
//!
//! Outcome of a cleanup pass and the bodies served over HTTP.

pub mod responses;

// Re-export commonly used types
pub use responses::{CleanupReport, HealthResponse};
