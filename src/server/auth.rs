//! Bearer token authentication for the session API.
//!
//! Every session endpoint requires
//!
//! ```text
//! authorization: Bearer <API_KEY>
//! ```
//!
//! where `API_KEY` is the secret configured at startup. This is a plain
//! shared-secret check: there is a single key, it is compared directly and
//! it cannot be rotated without a restart.
//!
//! # Example
//!
//! ```rust
//! use session_api::server::auth::ApiKeyAuth;
//!
//! let auth = ApiKeyAuth::new("my-secret-key").unwrap();
//!
//! assert!(auth.verify(Some("Bearer my-secret-key")).is_ok());
//! assert!(auth.verify(Some("Bearer wrong")).is_err());
//! assert!(auth.verify(None).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::error::{ApiError, ConfigError};

/// Prefix every authorization header must start with.
pub const BEARER_PREFIX: &str = "Bearer ";

const MISSING_HEADER: &str = "Missing authorization header";
const NOT_BEARER: &str = "Authorization header must use Bearer format";
const INVALID_KEY: &str = "Invalid API key";

// =============================================================================
// API Key Authentication
// =============================================================================

/// Shared-secret authenticator.
///
/// Built once at startup from configuration and cloned into the middleware.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Arc<str>,
}

impl ApiKeyAuth {
    /// Create an authenticator for `api_key`.
    ///
    /// Fails if the key is empty or only whitespace: the service must not
    /// start without a usable secret.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_key: Arc::from(api_key),
        })
    }

    /// Check the value of an `authorization` header.
    pub fn verify(&self, header: Option<&str>) -> Result<(), ApiError> {
        let header = header
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ApiError::unauthorized(MISSING_HEADER))?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| ApiError::unauthorized(NOT_BEARER))?
            .trim();

        if token.is_empty() || token != &*self.api_key {
            return Err(ApiError::unauthorized(INVALID_KEY));
        }

        Ok(())
    }

    /// Check the `authorization` header of a request.
    ///
    /// A header value that is not visible ASCII cannot carry a Bearer token
    /// and is rejected as such.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        match headers.get(AUTHORIZATION) {
            None => self.verify(None),
            Some(value) => match value.to_str() {
                Ok(value) => self.verify(Some(value)),
                Err(_) => Err(ApiError::unauthorized(NOT_BEARER)),
            },
        }
    }
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware rejecting requests without a valid bearer token.
///
/// On failure the wrapped handler is never called; the error is rendered by
/// `ApiError`'s response mapping.
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use session_api::server::auth::{auth_middleware, ApiKeyAuth};
///
/// let auth = ApiKeyAuth::new("secret-key")?;
/// let app = Router::new()
///     .route("/getSession", get(handler))
///     .route_layer(middleware::from_fn_with_state(auth, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth.verify_headers(request.headers())?;
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
