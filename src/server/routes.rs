//! Router configuration for the session API.
//!
//! This module defines the HTTP routes and applies middleware for
//! authentication, CORS and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                         - Health check (public)
//! /createSession                  - POST, create a session (protected)
//! /getSession?sessionId=          - GET, fetch a session (protected)
//! /updateSessionStatus?sessionId= - POST/PUT/PATCH, change status (protected)
//! /listSessions                   - GET, list sessions (protected)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use session_api::server::{create_router, ApiKeyAuth, RouterConfig};
//! use session_api::session::SessionService;
//! use session_api::store::MemoryDocumentStore;
//!
//! let service = SessionService::new(MemoryDocumentStore::new());
//! let config = RouterConfig::new(ApiKeyAuth::new("my-secret-key")?)
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, ApiKeyAuth};
use super::handlers::{
    create_session_handler, get_session_handler, health_handler, list_sessions_handler,
    method_not_allowed_handler, not_found_handler, update_session_status_handler, AppState,
};
use crate::session::SessionService;
use crate::store::DocumentStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Bearer token authenticator applied to every session route
    pub auth: ApiKeyAuth,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given authenticator.
    ///
    /// By default CORS allows any origin and tracing is enabled.
    pub fn new(auth: ApiKeyAuth) -> Self {
        Self {
            auth,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Session routes sit behind the auth middleware; `/health` and the JSON
/// 404/405 fallbacks do not. CORS wraps everything so preflight requests never need
/// credentials.
pub fn create_router<D>(sessions: SessionService<D>, config: RouterConfig) -> Router
where
    D: DocumentStore + 'static,
{
    let app_state = AppState::new(sessions);
    let cors = build_cors_layer(&config);

    let session_routes = Router::new()
        .route("/createSession", post(create_session_handler::<D>))
        .route("/getSession", get(get_session_handler::<D>))
        .route(
            "/updateSessionStatus",
            post(update_session_status_handler::<D>)
                .put(update_session_status_handler::<D>)
                .patch(update_session_status_handler::<D>),
        )
        .route("/listSessions", get(list_sessions_handler::<D>))
        .route_layer(middleware::from_fn_with_state(
            config.auth.clone(),
            auth_middleware,
        ))
        .with_state(app_state);

    let router = Router::new()
        .merge(session_routes)
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
