//! HTTP server layer for the session API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   /createSession  /getSession  /updateSessionStatus  /listSessions
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │  (bearer)   │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod params;
pub mod routes;

pub use auth::{auth_middleware, ApiKeyAuth, BEARER_PREFIX};
pub use handlers::{
    create_session_handler, get_session_handler, health_handler, list_sessions_handler,
    method_not_allowed_handler, not_found_handler, update_session_status_handler, ApiResponse, AppState, ErrorBody,
    ErrorResponse, HealthResponse, ListMeta,
};
pub use params::{QueryParams, QueryValue};
pub use routes::{create_router, RouterConfig};
