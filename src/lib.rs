//! # Session API
//!
//! A small authenticated HTTP API for creating, retrieving, updating and
//! listing region-scoped session records kept in a document store.
//!
//! ## Features
//!
//! - **Bearer authentication**: every session endpoint requires the configured API key
//! - **Validation**: regions, statuses, ids and pagination parameters are checked
//!   before anything touches storage
//! - **Pluggable storage**: S3-backed JSON documents in production, an in-memory
//!   store for development and tests
//! - **Offset pagination**: newest-first listing with filters and a total count
//!
//! ## Architecture
//!
//! - [`store`] - Document store trait, query evaluation and backends
//! - [`session`] - Session record, validation and lifecycle operations
//! - [`server`] - Axum handlers, auth middleware and router
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use session_api::{create_router, ApiKeyAuth, MemoryDocumentStore, RouterConfig, SessionService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let auth = ApiKeyAuth::new("my-secret-key").expect("non-empty key");
//!     let service = SessionService::new(MemoryDocumentStore::new());
//!     let router = create_router(service, RouterConfig::new(auth));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, StoreBackend, StoreConfig};
pub use error::{ApiError, ConfigError, StoreError};
pub use server::{
    auth_middleware, create_router, health_handler, ApiKeyAuth, ApiResponse, AppState,
    ErrorResponse, HealthResponse, ListMeta, RouterConfig,
};
pub use session::{ListSessionsQuery, Session, SessionPage, SessionService, SessionStatus};
pub use store::{
    create_s3_client, Direction, Document, DocumentStore, MemoryDocumentStore, Query,
    S3DocumentStore,
};
