//! In-Memory Document Store
//!
//! HashMap-backed store for local development and tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{Document, DocumentStore};

#[derive(Debug, Default)]
struct Collections {
    /// Collection name to (document id to document)
    documents: HashMap<String, HashMap<String, Document>>,
    /// When set, every listing fails
    listing_fails: bool,
    /// Document ids whose deletion fails
    failing_deletes: HashSet<String>,
}

// == In-Memory Document Store ==
/// Document store held in process memory.
///
/// Clones share the same underlying collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `document` in `collection`.
    pub async fn insert(&self, collection: &str, document: Document) {
        let mut inner = self.inner.write().await;
        inner
            .documents
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
    }

    /// Fetches one document by id.
    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let inner = self.inner.read().await;
        inner
            .documents
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Number of documents in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let inner = self.inner.read().await;
        inner.documents.get(collection).map_or(0, HashMap::len)
    }

    // == Fault Injection ==
    /// Makes every subsequent listing fail (or succeed again).
    pub async fn fail_listing(&self, fail: bool) {
        self.inner.write().await.listing_fails = fail;
    }

    /// Makes every subsequent deletion of `id` fail.
    pub async fn fail_delete_of(&self, id: impl Into<String>) {
        self.inner.write().await.failing_deletes.insert(id.into());
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        if inner.listing_fails {
            return Err(StoreError::Unavailable(format!(
                "listing of collection '{}' is failing",
                collection
            )));
        }

        let mut documents: Vec<Document> = inner
            .documents
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(documents)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.failing_deletes.contains(id) {
            return Err(StoreError::Backend {
                status: 503,
                message: format!("delete of '{}' rejected", id),
            });
        }

        if let Some(docs) = inner.documents.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
