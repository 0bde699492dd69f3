//! Document store abstraction.
//!
//! Sessions are persisted in an external document store. This module defines
//! the narrow interface the session service needs and the backends that
//! implement it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             SessionService              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          DocumentStore Trait            │
//! │   (get / set / update / query / count)  │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │ MemoryDocument  │    │  S3DocumentStore    │
//! │     Store       │    │ (JSON objects)      │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! Query evaluation (equality filters, ordering, `start_after` cursors and
//! limits) lives in [`Query`] so every backend orders and pages documents the
//! same way.

mod memory;
mod query;
mod s3_store;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use memory::MemoryDocumentStore;
pub use query::{compare_values, Direction, OrderBy, Query};
pub use s3_store::{create_s3_client, S3DocumentStore};

// =============================================================================
// Document
// =============================================================================

/// A stored document: its id within the collection plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id (unique within its collection)
    pub id: String,

    /// Document body, always a JSON object
    pub data: Value,
}

impl Document {
    /// Create a document from an id and body.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a top-level field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Decode the document body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// Trait for document collections keyed by id.
///
/// Each call targets a single document or a single query; implementations are
/// expected to make `set` and `update` atomic per document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, returning `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Run a query and return the matching documents in query order.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Count every document matching the query's filters.
    ///
    /// The query's limit and cursor are ignored.
    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let documents = self.query(&query.without_window()).await?;
        Ok(documents.len())
    }
}

/// Shallow-merge `fields` into a document body.
pub(crate) fn merge_fields(data: &mut Value, fields: Map<String, Value>) -> Result<(), StoreError> {
    let object = data.as_object_mut().ok_or_else(|| {
        StoreError::Serialization("stored document is not a JSON object".to_string())
    })?;

    for (key, value) in fields {
        object.insert(key, value);
    }

    Ok(())
}
