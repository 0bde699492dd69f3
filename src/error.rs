use thiserror::Error;

/// Errors raised by a document store backend
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Error reported by the storage service (S3 or S3-compatible)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Partial update targeted a document that does not exist
    #[error("Document not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors returned by the session API.
///
/// Every variant maps to exactly one HTTP status and machine-readable code
/// (see [`ApiError::status_code`] and [`ApiError::code`]).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request input failed validation (400)
    #[error("{0}")]
    Validation(String),

    /// The named resource does not exist (404)
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// The path exists but does not accept the request method (405)
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Anything unexpected (500). The cause is never shown to clients.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Create a not-found error for the named resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an authentication error with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            ApiError::Validation(_) => http::StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => http::StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed(_) => http::StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to return to API consumers.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Fixed message returned for every internal error.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Configuration problems that prevent the service from starting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No API key was configured
    #[error("API key is required. Set --api-key or API_KEY")]
    MissingApiKey,

    /// A required setting is missing for the selected store
    #[error("{0}")]
    MissingSetting(String),
}
