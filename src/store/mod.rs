//! Document Store Module
//!
//! The narrow interface the cleanup pass needs from a document database,
//! plus an in-memory backend and a Firestore REST backend.

mod document;
mod firestore;
mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;

// Re-export public types
pub use document::{Document, FieldValue, REGISTRATION_TIME_FIELD};
pub use firestore::{FirestoreConfig, FirestoreStore, FIRESTORE_BASE_URL};
pub use memory::InMemoryDocumentStore;

// == Document Store Trait ==
/// A collection-oriented document database.
///
/// One client is constructed per process and shared by every invocation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a snapshot of every document currently in `collection`.
    async fn list_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Deletes the document `id` from `collection`.
    ///
    /// Deleting a document that no longer exists succeeds.
    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<()>;
}
