//! Session record and its closed value sets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

// =============================================================================
// Constants
// =============================================================================

/// Regions a session may be created in.
pub const VALID_REGIONS: [&str; 4] = ["eu-central", "us-east", "us-west", "ap-southeast"];

/// Collection holding session documents.
pub const SESSIONS_COLLECTION: &str = "sessions";

/// Page size used when a list request does not give one.
pub const DEFAULT_LIMIT: usize = 20;

/// Smallest accepted page size.
pub const MIN_LIMIT: usize = 1;

/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

/// Offset used when a list request does not give one.
pub const DEFAULT_OFFSET: usize = 0;

// =============================================================================
// SessionStatus
// =============================================================================

/// Lifecycle label of a session.
///
/// Any status may follow any other; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Every status, in declaration order.
    pub const ALL: [SessionStatus; 4] = [
        SessionStatus::Pending,
        SessionStatus::Active,
        SessionStatus::Completed,
        SessionStatus::Failed,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings that are not a known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for SessionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// Session
// =============================================================================

/// A persisted session.
///
/// This is both the API representation and the stored document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Server-generated unique id, never reassigned
    pub session_id: String,

    /// Region the session was created in, immutable
    pub region: String,

    /// Current lifecycle status
    pub status: SessionStatus,

    /// Creation time, immutable
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,

    /// Time of the last status change (creation time until then)
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a fresh pending session in `region` with a new random id.
    pub fn new(region: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            region: region.into(),
            status: SessionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Format a timestamp the way it is stored: RFC 3339, nanoseconds, `Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(timestamp))
}
