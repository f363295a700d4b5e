//! Error types for the cleanup service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

// == Store Error Enum ==
/// Failure reported by a document store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status
    #[error("Store returned status {status}: {message}")]
    Backend { status: u16, message: String },

    /// The store answered with a body we could not understand
    #[error("Malformed store response: {0}")]
    Decode(String),
}

// == Record Read Error Enum ==
/// Failure reading a typed field out of a stored document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordReadError {
    #[error("field `{0}` is missing")]
    Missing(&'static str),

    #[error("field `{field}` is not a timestamp (found {found})")]
    NotATimestamp {
        field: &'static str,
        found: &'static str,
    },
}

// == Cleanup Error Enum ==
/// Failure of a whole cleanup pass.
#[derive(Error, Debug)]
pub enum CleanupError {
    /// The pending user snapshot could not be fetched
    #[error("Failed to retrieve pending users: {0}")]
    Retrieval(#[source] StoreError),

    /// A pending user record carried an unreadable registration time
    #[error("Failed to read pending user {id}: {source}")]
    RecordRead {
        id: String,
        #[source]
        source: RecordReadError,
    },
}

// == IntoResponse Implementation ==
// Callers never learn which stage failed.
impl IntoResponse for CleanupError {
    fn into_response(self) -> Response {
        error!(error = %self, "Error cleaning up pending users");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for cleanup passes.
pub type Result<T> = std::result::Result<T, CleanupError>;

/// Convenience Result type for document store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
