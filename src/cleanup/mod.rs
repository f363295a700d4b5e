//! Cleanup Module
//!
//! Removes pending user registrations that were never completed.
//!
//! # Policy
//! - A record is stale when it registered strictly before `now - 2 minutes`.
//! - A record whose registration time cannot be read aborts the whole pass
//!   before anything is deleted.

mod sweep;


pub use sweep::{cutoff, sweep_stale_pending_users};

// == Public Constants ==
/// Collection holding pending user registrations
pub const PENDING_USERS_COLLECTION: &str = "pending_users";

/// Age in milliseconds after which a pending registration is stale
pub const STALE_AFTER_MS: i64 = 2 * 60 * 1000;
