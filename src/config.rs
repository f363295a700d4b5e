//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::store::{FirestoreConfig, FIRESTORE_BASE_URL};

/// Firestore's name for a project's default database.
const DEFAULT_DATABASE: &str = "(default)";

/// Token the Firestore emulator accepts as an administrator.
const EMULATOR_TOKEN: &str = "owner";

/// Which document store backend the service talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store, for development
    #[default]
    Memory,
    /// Cloud Firestore over REST
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "firestore" => Ok(StoreBackend::Firestore),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// The stale window itself is fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between in-process cleanup passes, 0 disables them
    pub cleanup_interval: u64,
    /// Document store backend
    pub store_backend: StoreBackend,
    /// Google Cloud project holding the Firestore database
    pub firestore_project_id: Option<String>,
    /// Firestore database id
    pub firestore_database: String,
    /// `host:port` of a Firestore emulator, overrides the public endpoint
    pub firestore_emulator_host: Option<String>,
    /// OAuth2 bearer token for Firestore
    pub firestore_access_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CLEANUP_INTERVAL` - Seconds between in-process passes (default: 0, disabled)
    /// - `STORE_BACKEND` - `memory` or `firestore` (default: memory)
    /// - `FIRESTORE_PROJECT_ID` - Project id, required for the firestore backend
    /// - `FIRESTORE_DATABASE` - Database id (default: `(default)`)
    /// - `FIRESTORE_EMULATOR_HOST` - Emulator `host:port`
    /// - `FIRESTORE_ACCESS_TOKEN` - Bearer token
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            store_backend: env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store_backend),
            firestore_project_id: non_empty_var("FIRESTORE_PROJECT_ID"),
            firestore_database: non_empty_var("FIRESTORE_DATABASE")
                .unwrap_or(defaults.firestore_database),
            firestore_emulator_host: non_empty_var("FIRESTORE_EMULATOR_HOST"),
            firestore_access_token: non_empty_var("FIRESTORE_ACCESS_TOKEN"),
        }
    }

    /// Firestore connection parameters, or None when no project is configured.
    ///
    /// With an emulator host set, requests go to `http://{host}` and default
    /// to the emulator's administrator token.
    pub fn firestore(&self) -> Option<FirestoreConfig> {
        let project_id = self.firestore_project_id.clone()?;

        let (base_url, access_token) = match &self.firestore_emulator_host {
            Some(host) => (
                format!("http://{}", host),
                self.firestore_access_token
                    .clone()
                    .or_else(|| Some(EMULATOR_TOKEN.to_string())),
            ),
            None => (
                FIRESTORE_BASE_URL.to_string(),
                self.firestore_access_token.clone(),
            ),
        };

        Some(FirestoreConfig {
            base_url,
            project_id,
            database: self.firestore_database.clone(),
            access_token,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cleanup_interval: 0,
            store_backend: StoreBackend::Memory,
            firestore_project_id: None,
            firestore_database: DEFAULT_DATABASE.to_string(),
            firestore_emulator_host: None,
            firestore_access_token: None,
        }
    }
}
