//! Session lifecycle operations against the document store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::{ApiError, StoreError};
use crate::store::{Direction, DocumentStore, Query};

use super::model::{format_timestamp, Session, SessionStatus, SESSIONS_COLLECTION};

/// Filters and window for listing sessions.
///
/// `limit` and `offset` are expected to be validated already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSessionsQuery {
    pub status: Option<SessionStatus>,
    pub region: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

/// One page of sessions plus the number of sessions matching the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub total: usize,
}

/// Creates, reads, updates and lists sessions.
pub struct SessionService<D: DocumentStore> {
    store: Arc<D>,
}

impl<D: DocumentStore> SessionService<D> {
    /// Create a service over the given store.
    pub fn new(store: D) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a service over a store that is shared with other owners.
    pub fn from_shared(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Create a pending session in `region`.
    ///
    /// The region must already be validated. The id is a random UUID; no
    /// collision check is made.
    pub async fn create_session(&self, region: &str) -> Result<Session, ApiError> {
        let session = Session::new(region);
        let data = serde_json::to_value(&session).map_err(StoreError::from)?;

        self.store
            .set(SESSIONS_COLLECTION, &session.session_id, data)
            .await?;

        info!(
            session_id = %session.session_id,
            region = %session.region,
            "Session created"
        );

        Ok(session)
    }

    /// Fetch a session by id.
    pub async fn get_session(&self, session_id: &str) -> Result<Session, ApiError> {
        let document = self
            .store
            .get(SESSIONS_COLLECTION, session_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Session"))?;

        Ok(document.decode()?)
    }

    /// Set a session's status and refresh its `updatedAt`.
    ///
    /// Any status may replace any other. The returned record is re-read from
    /// the store after the write.
    pub async fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Session, ApiError> {
        let current = self.get_session(session_id).await?;

        // Keep updatedAt >= createdAt even if the clock stepped backwards.
        let updated_at = Utc::now().max(current.created_at);

        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status.as_str()));
        fields.insert(
            "updatedAt".to_string(),
            Value::String(format_timestamp(&updated_at)),
        );

        self.store
            .update(SESSIONS_COLLECTION, session_id, fields)
            .await?;

        info!(
            session_id = %session_id,
            from = %current.status,
            to = %status,
            "Session status updated"
        );

        self.get_session(session_id).await
    }

    /// List sessions newest first.
    ///
    /// `total` counts every matching session regardless of the window. The
    /// offset is applied by reading the first `offset` matches and resuming
    /// after the last of them, so cost grows with the offset.
    pub async fn list_sessions(&self, query: &ListSessionsQuery) -> Result<SessionPage, ApiError> {
        let mut base = Query::collection(SESSIONS_COLLECTION);

        if let Some(status) = query.status {
            base = base.where_eq("status", json!(status.as_str()));
        }

        if let Some(region) = &query.region {
            base = base.where_eq("region", json!(region));
        }

        let base = base.order_by("createdAt", Direction::Descending);

        let total = self.store.count(&base).await?;

        let mut page_query = base.clone();
        if query.offset > 0 {
            let skipped = self.store.query(&base.clone().limit(query.offset)).await?;
            if let Some(last) = skipped.last() {
                page_query = page_query.start_after(last.clone());
            }
        }

        let documents = self.store.query(&page_query.limit(query.limit)).await?;
        let sessions = documents
            .iter()
            .map(|doc| doc.decode::<Session>())
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            total = total,
            returned = sessions.len(),
            limit = query.limit,
            offset = query.offset,
            "Sessions listed"
        );

        Ok(SessionPage { sessions, total })
    }
}

impl<D: DocumentStore> Clone for SessionService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
