//! Session API - HTTP service for region-scoped sessions.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_api::{
    config::{CheckConfig, Cli, Command, ServeConfig, StoreBackend, StoreConfig},
    create_s3_client,
    server::{create_router, ApiKeyAuth, RouterConfig},
    session::{SessionService, SessionStatus, SESSIONS_COLLECTION},
    store::{DocumentStore, MemoryDocumentStore, Query, S3DocumentStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let auth = match ApiKeyAuth::new(config.api_key().unwrap_or_default()) {
        Ok(auth) => auth,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Session API v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Auth: bearer API key");
    match &config.cors_origins {
        Some(origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    match config.store.store {
        StoreBackend::Memory => {
            warn!("  Store: MEMORY - sessions are lost when the process exits");
            serve(MemoryDocumentStore::new(), &config, auth).await
        }
        StoreBackend::S3 => {
            let store = build_s3_store(&config.store).await;
            log_s3_settings(&config.store, &store);

            info!("");
            info!("Connecting to document store...");
            match count_sessions(&store, None).await {
                Ok(count) => {
                    info!("  Connected successfully");
                    info!("  Found {} session(s)", count);
                }
                Err(e) => {
                    error!("  Failed to reach the document store: {}", e);
                    error!("");
                    error!("  Please check:");
                    error!("    - Your AWS credentials are configured correctly");
                    error!("    - The bucket '{}' exists and is accessible", store.bucket());
                    error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
                    return ExitCode::FAILURE;
                }
            }

            serve(store, &config, auth).await
        }
    }
}

/// Build the router for `store` and serve it until the process stops.
async fn serve<D>(store: D, config: &ServeConfig, auth: ApiKeyAuth) -> ExitCode
where
    D: DocumentStore + 'static,
{
    let router = create_router(SessionService::new(store), build_router_config(config, auth));
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -H 'authorization: Bearer <API_KEY>' http://{}/listSessions",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "session_api=debug,tower_http=debug"
    } else {
        "session_api=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig, auth: ApiKeyAuth) -> RouterConfig {
    let mut router_config = RouterConfig::new(auth);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

/// Create the S3 document store described by `config`.
async fn build_s3_store(config: &StoreConfig) -> S3DocumentStore {
    let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let store = S3DocumentStore::new(client, config.bucket().unwrap_or_default());

    match config.s3_prefix {
        Some(ref prefix) => store.with_prefix(prefix.clone()),
        None => store,
    }
}

fn log_s3_settings(config: &StoreConfig, store: &S3DocumentStore) {
    info!("  Store: S3");
    info!("  S3 bucket: {}", store.bucket());
    if !store.prefix().is_empty() {
        info!("  S3 prefix: {}", store.prefix());
    }
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
}

/// Count stored sessions, optionally only those with `status`.
async fn count_sessions<D: DocumentStore>(
    store: &D,
    status: Option<SessionStatus>,
) -> Result<usize, session_api::StoreError> {
    let mut query = Query::collection(SESSIONS_COLLECTION);
    if let Some(status) = status {
        query = query.where_eq("status", json!(status.as_str()));
    }
    store.count(&query).await
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Session API Configuration Check");
    println!("═══════════════════════════════");
    println!();

    if let Err(e) = config.store.validate() {
        println!("✗ Store: {}", e);
        return ExitCode::FAILURE;
    }

    match config.store.store {
        StoreBackend::Memory => {
            println!("✓ Store: memory (nothing to check)");
            println!();
            println!("═══════════════════════════════");
            println!("✓ All checks passed!");
            ExitCode::SUCCESS
        }
        StoreBackend::S3 => {
            let store = build_s3_store(&config.store).await;
            println!("✓ Bucket: {}", store.bucket());
            if !store.prefix().is_empty() {
                println!("✓ Prefix: {}", store.prefix());
            }
            if let Some(ref endpoint) = config.store.s3_endpoint {
                println!("✓ Endpoint: {}", endpoint);
            }
            println!("✓ Region: {}", config.store.s3_region);
            println!();

            check_store(&store, config.by_status).await
        }
    }
}

async fn check_store<D: DocumentStore>(store: &D, by_status: bool) -> ExitCode {
    print!("Reading sessions... ");

    match count_sessions(store, None).await {
        Ok(count) => {
            println!("✓ success");
            println!("  {} session(s) stored", count);
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!("  - The bucket exists and is accessible");
            return ExitCode::FAILURE;
        }
    }

    if by_status {
        println!();
        println!("Sessions by status:");
        println!("───────────────────");

        for status in SessionStatus::ALL {
            match count_sessions(store, Some(status)).await {
                Ok(count) => println!("  {:<10} {}", status.as_str(), count),
                Err(e) => {
                    println!("  {:<10} error: {}", status.as_str(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    println!();
    println!("═══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
