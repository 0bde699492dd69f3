//! HTTP request handlers for the session API.
//!
//! Each handler pulls raw fields from the request, runs them through the
//! validation layer, calls the session service and wraps the result in the
//! `{ "success": true, "data": ... }` envelope. Errors are returned as
//! [`ApiError`] and rendered by its `IntoResponse` implementation.
//!
//! # Endpoints
//!
//! - `POST /createSession` - Create a session
//! - `GET /getSession?sessionId=` - Fetch a session
//! - `POST /updateSessionStatus?sessionId=` - Change a session's status
//! - `GET /listSessions` - List sessions with filters and pagination
//! - `GET /health` - Health check endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::params::{QueryParams, QueryValue};
use crate::error::ApiError;
use crate::session::{
    parse_limit, parse_offset, validate_region, validate_session_id, validate_status,
    ListSessionsQuery, Session, SessionService,
};
use crate::store::DocumentStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the session service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<D: DocumentStore> {
    /// Session lifecycle operations
    pub sessions: SessionService<D>,
}

impl<D: DocumentStore> AppState<D> {
    /// Create a new application state with the given session service.
    pub fn new(sessions: SessionService<D>) -> Self {
        Self { sessions }
    }
}

impl<D: DocumentStore> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
        }
    }
}

// =============================================================================
// Request Parsing
// =============================================================================

/// Parse a request body as a JSON object.
///
/// Missing, empty or non-object bodies yield an empty object so that absent
/// fields are reported by validation.
fn parse_body(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

/// A body field, if present and a JSON string.
fn string_field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

// =============================================================================
// Response Types
// =============================================================================

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    pub data: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Wrap `data` in a success envelope with pagination metadata.
    pub fn with_meta(data: T, meta: ListMeta) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMeta {
    /// Number of sessions matching the filters, ignoring the window
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    pub error: ErrorBody,
}

/// Error details inside [`ErrorResponse`].
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code (e.g., "VALIDATION_ERROR")
    pub code: String,

    /// Human-readable message, safe to show to clients
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ApiError to HTTP response.
///
/// Internal errors are logged with their cause at ERROR level and answered
/// with a fixed message. Client errors are logged at WARN or DEBUG.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.client_message();

        match &self {
            ApiError::Internal(cause) => {
                error!(
                    error_type = code,
                    status = status.as_u16(),
                    "Unexpected error: {}",
                    cause
                );
            }
            ApiError::Unauthorized(_) => {
                warn!(
                    error_type = code,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
            ApiError::NotFound { .. } => {
                debug!(
                    error_type = code,
                    status = status.as_u16(),
                    "Resource not found: {}",
                    message
                );
            }
            ApiError::Validation(_) | ApiError::MethodNotAllowed(_) => {
                debug!(
                    error_type = code,
                    status = status.as_u16(),
                    "Client error: {}",
                    message
                );
            }
        }

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Log a fixed diagnostic for a failed store operation and pass the error on.
fn log_failure(operation: &'static str) -> impl FnOnce(ApiError) -> ApiError {
    move |err| {
        error!("Failed to {}", operation);
        err
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle session creation.
///
/// # Endpoint
///
/// `POST /createSession`
///
/// # Body
///
/// `{ "region": "eu-central" }`
///
/// # Response
///
/// - `201 Created`: `{ "success": true, "data": Session }`
/// - `400 Bad Request`: Missing or unknown region
pub async fn create_session_handler<D: DocumentStore + 'static>(
    State(state): State<AppState<D>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Session>>), ApiError> {
    let body = parse_body(&body);
    let region = string_field(&body, "region");

    validate_region(region)?;
    let region = region.unwrap_or_default();

    let session = state
        .sessions
        .create_session(region)
        .await
        .map_err(log_failure("create session"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// Handle session lookup.
///
/// # Endpoint
///
/// `GET /getSession?sessionId={id}`
///
/// # Response
///
/// - `200 OK`: `{ "success": true, "data": Session }`
/// - `400 Bad Request`: Missing session id
/// - `404 Not Found`: No such session
pub async fn get_session_handler<D: DocumentStore + 'static>(
    State(state): State<AppState<D>>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let session_id = params.get("sessionId").single();

    validate_session_id(session_id)?;
    let session_id = session_id.unwrap_or_default();

    let session = state
        .sessions
        .get_session(session_id)
        .await
        .map_err(log_failure("get session"))?;

    Ok(Json(ApiResponse::ok(session)))
}

/// Handle status updates.
///
/// # Endpoint
///
/// `POST /updateSessionStatus?sessionId={id}` (also PUT and PATCH)
///
/// # Body
///
/// `{ "status": "active" }`, optionally with `sessionId` when it is not in
/// the query string. The query string wins when both are given.
///
/// # Response
///
/// - `200 OK`: `{ "success": true, "data": Session }` as now stored
/// - `400 Bad Request`: Missing session id, missing or unknown status
/// - `404 Not Found`: No such session
pub async fn update_session_status_handler<D: DocumentStore + 'static>(
    State(state): State<AppState<D>>,
    params: QueryParams,
    body: Bytes,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let body = parse_body(&body);
    let session_id = match params.get("sessionId") {
        QueryValue::Many(_) => None,
        value => value.single().or_else(|| string_field(&body, "sessionId")),
    };

    validate_session_id(session_id)?;
    let status = validate_status(string_field(&body, "status"))?;
    let session_id = session_id.unwrap_or_default();

    let session = state
        .sessions
        .update_session_status(session_id, status)
        .await
        .map_err(log_failure("update session status"))?;

    Ok(Json(ApiResponse::ok(session)))
}

/// Handle session listing.
///
/// # Endpoint
///
/// `GET /listSessions`
///
/// # Query Parameters
///
/// - `status`: Only sessions with this status
/// - `region`: Only sessions in this region
/// - `limit`: Page size, 1-100 (default: 20)
/// - `offset`: Number of sessions to skip (default: 0)
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "success": true,
///   "data": [ ... ],
///   "meta": { "total": 42, "limit": 20, "offset": 0 }
/// }
/// ```
pub async fn list_sessions_handler<D: DocumentStore + 'static>(
    State(state): State<AppState<D>>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Vec<Session>>>, ApiError> {
    let status = match params.get("status").filter_input() {
        Some(raw) => Some(validate_status(raw)?),
        None => None,
    };

    let region = match params.get("region").filter_input() {
        Some(raw) => {
            validate_region(raw)?;
            raw.map(str::to_string)
        }
        None => None,
    };

    let query = ListSessionsQuery {
        status,
        region,
        limit: parse_limit(params.get("limit").raw().as_deref())?,
        offset: parse_offset(params.get("offset").raw().as_deref())?,
    };

    let page = state
        .sessions
        .list_sessions(&query)
        .await
        .map_err(log_failure("list sessions"))?;

    let meta = ListMeta {
        total: page.total,
        limit: query.limit,
        offset: query.offset,
    };

    Ok(Json(ApiResponse::with_meta(page.sessions, meta)))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Answer unknown paths with the standard error envelope.
pub async fn not_found_handler() -> ApiError {
    ApiError::not_found("Endpoint")
}

/// Answer a known path called with an unsupported method.
pub async fn method_not_allowed_handler(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

// =============================================================================
// Tests
// =============================================================================
