//! Configuration management for the session API.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks and defaults for everything optional.
//!
//! # Environment Variables
//!
//! - `API_KEY` - Bearer token clients must present (required)
//! - `SESSIONS_HOST` - Server bind address (default: 0.0.0.0)
//! - `SESSIONS_PORT` - Server port (default: 3000)
//! - `SESSIONS_STORE` - Document store backend, `s3` or `memory` (default: s3)
//! - `SESSIONS_S3_BUCKET` - Bucket holding session documents (required for s3)
//! - `SESSIONS_S3_PREFIX` - Key prefix inside the bucket
//! - `SESSIONS_S3_ENDPOINT` - Custom endpoint for S3-compatible services
//! - `SESSIONS_S3_REGION` - AWS region (default: us-east-1)
//! - `SESSIONS_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region for the S3 store.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

// =============================================================================
// CLI
// =============================================================================

/// Session API - create, update and list region-scoped sessions.
#[derive(Parser, Debug, Clone)]
#[command(name = "session-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed CLI and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server.
    Serve(ServeConfig),

    /// Check that the document store is reachable and report what it holds.
    Check(CheckConfig),
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Document store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// In-process store; data is lost on exit
    Memory,

    /// JSON documents in an S3 or S3-compatible bucket
    S3,
}

/// Settings selecting and locating the document store.
#[derive(Args, Debug, Clone)]
pub struct StoreConfig {
    /// Document store backend.
    #[arg(long, value_enum, default_value_t = StoreBackend::S3, env = "SESSIONS_STORE")]
    pub store: StoreBackend,

    /// S3 bucket holding session documents.
    #[arg(long, env = "SESSIONS_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix for all documents inside the bucket.
    #[arg(long, env = "SESSIONS_S3_PREFIX")]
    pub s3_prefix: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "SESSIONS_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_S3_REGION, env = "SESSIONS_S3_REGION")]
    pub s3_region: String,
}

impl StoreConfig {
    /// Validate store settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store == StoreBackend::S3 && self.bucket().is_none() {
            return Err(ConfigError::MissingSetting(
                "S3 bucket name is required. Set --s3-bucket or SESSIONS_S3_BUCKET, \
                 or use --store=memory"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// The configured bucket, if non-empty.
    pub fn bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref().filter(|b| !b.trim().is_empty())
    }
}

// =============================================================================
// Serve Configuration
// =============================================================================

/// Settings for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "SESSIONS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SESSIONS_PORT")]
    pub port: u16,

    /// Secret clients must send as `authorization: Bearer <key>`.
    ///
    /// The server refuses to start without it.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(flatten)]
    pub store: StoreConfig,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "SESSIONS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key().is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        self.store.validate()
    }

    /// The configured API key, if non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Check Configuration
// =============================================================================

/// Settings for `check`.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub store: StoreConfig,

    /// Also report how many sessions have each status.
    #[arg(long, default_value_t = false)]
    pub by_status: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
