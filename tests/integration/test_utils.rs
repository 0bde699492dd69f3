//! Test utilities for integration tests.
//!
//! Provides store doubles, router construction and request helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use session_api::error::StoreError;
use session_api::server::{create_router, ApiKeyAuth, RouterConfig};
use session_api::session::{Session, SessionService, SessionStatus, SESSIONS_COLLECTION};
use session_api::store::{Document, DocumentStore, MemoryDocumentStore, Query};

pub const TEST_API_KEY: &str = "test-api-key";

// =============================================================================
// Store Doubles
// =============================================================================

/// In-memory store that records every query it serves.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: MemoryDocumentStore,
    queries: Arc<RwLock<Vec<Query>>>,
    count_calls: Arc<AtomicUsize>,
    operations: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries passed to `query`, in call order.
    pub async fn queries(&self) -> Vec<Query> {
        self.queries.read().await.clone()
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Total number of store calls of any kind.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub async fn reset(&self) {
        self.queries.write().await.clear();
        self.count_calls.store(0, Ordering::SeqCst);
        self.operations.store(0, Ordering::SeqCst);
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.touch();
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.touch();
        self.inner.set(collection, id, data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.touch();
        self.inner.update(collection, id, fields).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.touch();
        self.queries.write().await.push(query.clone());
        self.inner.query(query).await
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        self.touch();
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count(query).await
    }
}

/// Store whose every call fails as if the backend were unreachable.
#[derive(Clone, Default)]
pub struct FailingStore;

fn unreachable_backend() -> StoreError {
    StoreError::Connection("connection refused by 10.1.2.3:9000".to_string())
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(unreachable_backend())
    }

    async fn set(&self, _collection: &str, _id: &str, _data: Value) -> Result<(), StoreError> {
        Err(unreachable_backend())
    }

    async fn update(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        Err(unreachable_backend())
    }

    async fn query(&self, _query: &Query) -> Result<Vec<Document>, StoreError> {
        Err(unreachable_backend())
    }
}

// =============================================================================
// Router and Seeding
// =============================================================================

/// Router over `store` protected by [`TEST_API_KEY`], tracing off.
pub fn test_router<D: DocumentStore + 'static>(store: D) -> Router {
    let auth = ApiKeyAuth::new(TEST_API_KEY).unwrap();
    create_router(
        SessionService::new(store),
        RouterConfig::new(auth).with_tracing(false),
    )
}

/// Store a session created `minutes` after a fixed epoch.
pub async fn seed_session<D: DocumentStore>(
    store: &D,
    id: &str,
    region: &str,
    status: SessionStatus,
    minutes: i64,
) {
    let created = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
        + Duration::minutes(minutes);
    let session = Session {
        session_id: id.to_string(),
        region: region.to_string(),
        status,
        created_at: created,
        updated_at: created,
    };

    store
        .set(
            SESSIONS_COLLECTION,
            id,
            serde_json::to_value(&session).unwrap(),
        )
        .await
        .unwrap();
}

// =============================================================================
// Requests
// =============================================================================

/// Build a request carrying the test bearer token.
pub fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    request_with_auth(method, uri, body, Some(&format!("Bearer {}", TEST_API_KEY)))
}

/// Build a request with an arbitrary (or no) authorization header.
pub fn request_with_auth(
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorization: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Parse an RFC 3339 timestamp from a response body.
pub fn timestamp(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

/// Session ids of a list response, in order.
pub fn session_ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["sessionId"].as_str().unwrap().to_string())
        .collect()
}
