//! S3-backed document store.
//!
//! Each document is a JSON object stored at
//! `{prefix}{collection}/{id}.json` in a single bucket. Queries list the
//! collection prefix, fetch every document and evaluate the query locally.

use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::StoreError;

use super::{merge_fields, Document, DocumentStore, Query};

const DOCUMENT_SUFFIX: &str = ".json";

/// S3-backed implementation of `DocumentStore`.
///
/// # Cost
///
/// S3 has no server-side query. Every `query` and `count` lists the whole
/// collection prefix and GETs each document before evaluating locally, so
/// each call costs one LIST page per 1000 keys plus one GET per document.
/// A session listing makes two such scans (count and page) and a third
/// when `offset > 0` (the cursor walk), regardless of `limit`.
///
/// # Example
///
/// ```ignore
/// use session_api::store::{create_s3_client, S3DocumentStore};
///
/// let client = create_s3_client(None, "us-east-1").await;
/// let store = S3DocumentStore::new(client, "my-bucket").with_prefix("prod/");
///
/// // Session "abc" lives at s3://my-bucket/prod/sessions/abc.json
/// let doc = store.get("sessions", "abc").await?;
/// ```
#[derive(Clone)]
pub struct S3DocumentStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3DocumentStore {
    /// Create a store writing to the root of `bucket`.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: String::new(),
        }
    }

    /// Place every collection under `prefix`. A trailing `/` is added if missing.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.prefix = prefix;
        self
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Object key holding a document.
    pub fn object_key(&self, collection: &str, id: &str) -> String {
        format!("{}{}{}", self.collection_prefix(collection), id, DOCUMENT_SUFFIX)
    }

    fn collection_prefix(&self, collection: &str) -> String {
        format!("{}{}/", self.prefix, collection)
    }

    /// Recover a document id from an object key in `collection`.
    fn document_id<'a>(&self, collection: &str, key: &'a str) -> Option<&'a str> {
        let rest = key.strip_prefix(self.collection_prefix(collection).as_str())?;
        let id = rest.strip_suffix(DOCUMENT_SUFFIX)?;
        // Nested keys belong to some other layout.
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(id)
    }

    /// List every document id in a collection, following continuation tokens.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let prefix = self.collection_prefix(collection);
        let mut ids = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let result = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(map_sdk_error)?;

            for object in result.contents() {
                if let Some(id) = object.key().and_then(|k| self.document_id(collection, k)) {
                    ids.push(id.to_string());
                }
            }

            if result.is_truncated() == Some(true) {
                continuation_token = result.next_continuation_token().map(|s| s.to_string());
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(ids)
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let key = self.object_key(collection, id);

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let is_not_found = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                    || e.raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);

                if is_not_found {
                    debug!(bucket = %self.bucket, key = %key, "Document not found");
                    return Ok(None);
                }
                return Err(map_sdk_error(e));
            }
        };

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();

        let data: Value = serde_json::from_slice(&body)?;
        Ok(Some(Document::new(id, data)))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        if !data.is_object() {
            return Err(StoreError::Serialization(
                "documents must be JSON objects".to_string(),
            ));
        }

        let key = self.object_key(collection, id);
        let body = serde_json::to_vec(&data)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        debug!(bucket = %self.bucket, key = %key, "Document written");
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut document = self
            .get(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(self.object_key(collection, id)))?;

        merge_fields(&mut document.data, fields)?;
        self.set(collection, id, document.data).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collection = query.collection_name();
        let ids = self.list_ids(collection).await?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            // Listed objects can disappear before they are fetched.
            if let Some(document) = self.get(collection, &id).await? {
                documents.push(document);
            }
        }

        Ok(query.apply(documents))
    }
}

/// Classify an S3 SDK failure.
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: StdError + 'static,
    R: Debug,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StoreError::Connection(DisplayErrorContext(&err).to_string())
        }
        _ => StoreError::Backend(DisplayErrorContext(&err).to_string()),
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services usually need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
