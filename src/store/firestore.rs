//! Firestore Document Store
//!
//! Talks to the Cloud Firestore v1 REST API (or its local emulator).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{Document, DocumentStore, FieldValue};

/// Documents requested per listing page.
const PAGE_SIZE: u32 = 300;

/// Public Firestore endpoint.
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

// == Configuration ==
/// Connection parameters for a Firestore database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// Scheme and host, e.g. `https://firestore.googleapis.com`
    pub base_url: String,
    /// Google Cloud project id
    pub project_id: String,
    /// Database id, usually `(default)`
    pub database: String,
    /// OAuth2 bearer token, if the endpoint requires one
    pub access_token: Option<String>,
}

// == Wire Types ==
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsPage {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl RawDocument {
    fn into_document(self) -> StoreResult<Document> {
        let id = match self.name.rsplit_once('/') {
            Some((_, id)) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(StoreError::Decode(format!(
                    "document name '{}' has no id segment",
                    self.name
                )))
            }
        };

        let fields = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), decode_value(value)))
            .collect();

        Ok(Document { id, fields })
    }
}

/// Decodes one Firestore typed value (`{"timestampValue": "..."}` and friends).
///
/// Kinds this service never reads, and malformed scalars, become `Other`.
fn decode_value(value: &Value) -> FieldValue {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return FieldValue::Other;
    };

    match kind.as_str() {
        "timestampValue" => inner
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| FieldValue::Timestamp(at.with_timezone(&Utc)))
            .unwrap_or(FieldValue::Other),
        "stringValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .unwrap_or(FieldValue::Other),
        // int64 values travel as decimal strings
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse().ok())
            .or_else(|| inner.as_i64())
            .map(FieldValue::Integer)
            .unwrap_or(FieldValue::Other),
        "doubleValue" => inner
            .as_f64()
            .map(FieldValue::Double)
            .unwrap_or(FieldValue::Other),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .unwrap_or(FieldValue::Other),
        "nullValue" => FieldValue::Null,
        _ => FieldValue::Other,
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

// == Firestore Store ==
/// Document store backed by Firestore's REST API.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    /// Builds a client for the given database.
    pub fn new(config: FirestoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database,
            collection
        )
    }

    /// URL of one document. The id is pushed as a single percent-encoded
    /// path segment, so `#`, `?`, `/` and `%` stay part of the id.
    fn document_url(&self, collection: &str, id: &str) -> StoreResult<Url> {
        let mut url = Url::parse(&self.collection_url(collection))
            .map_err(|e| StoreError::Unavailable(format!("invalid Firestore URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("Firestore URL cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turns a non-2xx response into a `StoreError::Backend`.
async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = ensure_success(self.authorize(request).send().await?).await?;
            let page: ListDocumentsPage = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            debug!(
                "Fetched {} documents from '{}'",
                page.documents.len(),
                collection
            );
            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<()> {
        let url = self.document_url(collection, id)?;
        let response = self.authorize(self.client.delete(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response).await?;
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COLLECTION_PATH: &str = "/v1/projects/demo/databases/(default)/documents/pending_users";

    fn store_for(server: &MockServer, token: Option<&str>) -> FirestoreStore {
        FirestoreStore::new(FirestoreConfig {
            base_url: server.uri(),
            project_id: "demo".to_string(),
            database: "(default)".to_string(),
            access_token: token.map(str::to_string),
        })
        .unwrap()
    }

    fn raw_doc(id: &str, fields: Value) -> Value {
        json!({
            "name": format!("projects/demo/databases/(default)/documents/pending_users/{}", id),
            "fields": fields,
        })
    }

    #[test]
    fn test_decode_value_kinds() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        assert_eq!(
            decode_value(&json!({"timestampValue": "2024-05-06T07:08:09Z"})),
            FieldValue::Timestamp(at)
        );
        assert_eq!(
            decode_value(&json!({"stringValue": "x"})),
            FieldValue::String("x".to_string())
        );
        assert_eq!(
            decode_value(&json!({"integerValue": "42"})),
            FieldValue::Integer(42)
        );
        assert_eq!(
            decode_value(&json!({"booleanValue": true})),
            FieldValue::Boolean(true)
        );
        assert_eq!(decode_value(&json!({"nullValue": null})), FieldValue::Null);
        assert_eq!(
            decode_value(&json!({"mapValue": {"fields": {}}})),
            FieldValue::Other
        );
    }

    #[test]
    fn test_decode_malformed_timestamp_is_other() {
        assert_eq!(
            decode_value(&json!({"timestampValue": "not a time"})),
            FieldValue::Other
        );
    }

    #[test]
    fn test_decode_fractional_timestamp() {
        let value = decode_value(&json!({"timestampValue": "2024-05-06T07:08:09.123456Z"}));
        match value {
            FieldValue::Timestamp(at) => assert_eq!(at.timestamp_subsec_micros(), 123_456),
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_document_without_id_is_rejected() {
        let raw = RawDocument {
            name: "projects/demo/databases/(default)/documents/pending_users/".to_string(),
            fields: HashMap::new(),
        };
        assert!(matches!(raw.into_document(), Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_list_all_follows_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    raw_doc("a", json!({"registrationTime": {"timestampValue": "2024-01-01T00:00:00Z"}})),
                ],
                "nextPageToken": "page-2",
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [raw_doc("b", json!({"email": {"stringValue": "b@example.com"}}))],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        let documents = store.list_all("pending_users").await.unwrap();

        let ids: Vec<&str> = documents.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(documents[0].registration_time_ms().is_ok());
        assert!(documents[1].registration_time_ms().is_err());
    }

    #[tokio::test]
    async fn test_list_all_empty_collection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        assert!(store.list_all("pending_users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, Some("secret-token"));
        assert!(store.list_all("pending_users").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_all_backend_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        let result = store.list_all("pending_users").await;

        assert!(matches!(
            result,
            Err(StoreError::Backend { status: 403, ref message }) if message == "permission denied"
        ));
    }

    #[tokio::test]
    async fn test_list_all_unreachable() {
        let store = FirestoreStore::new(FirestoreConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            project_id: "demo".to_string(),
            database: "(default)".to_string(),
            access_token: None,
        })
        .unwrap();

        assert!(matches!(
            store.list_all("pending_users").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/a", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        assert!(store.delete_by_id("pending_users", "a").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_escapes_reserved_characters_in_id() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/victim%23stale", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/victim%3Fx=1", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        // A document whose id is a prefix of the stale ids must never be hit
        Mock::given(method("DELETE"))
            .and(path(format!("{}/victim", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        store.delete_by_id("pending_users", "victim#stale").await.unwrap();
        store.delete_by_id("pending_users", "victim?x=1").await.unwrap();

        server.verify().await;
    }

    #[test]
    fn test_document_url_keeps_slash_inside_id() {
        let store = FirestoreStore::new(FirestoreConfig {
            base_url: "http://localhost:8081/".to_string(),
            project_id: "demo".to_string(),
            database: "(default)".to_string(),
            access_token: None,
        })
        .unwrap();

        let url = store.document_url("pending_users", "a/b%c").unwrap();
        assert_eq!(
            url.path(),
            format!("{}/a%2Fb%25c", COLLECTION_PATH)
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_document_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/gone", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        assert!(store.delete_by_id("pending_users", "gone").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_backend_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/a", COLLECTION_PATH)))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server, None);
        assert!(matches!(
            store.delete_by_id("pending_users", "a").await,
            Err(StoreError::Backend { status: 500, .. })
        ));
    }
}
