//! Session domain: the record, its validation rules and lifecycle operations.
//!
//! ```text
//! handler input ──► validation ──► SessionService ──► DocumentStore
//! ```

mod model;
mod service;
pub mod validation;

pub use model::{
    format_timestamp, Session, SessionStatus, UnknownStatus, DEFAULT_LIMIT, DEFAULT_OFFSET,
    MAX_LIMIT, MIN_LIMIT, SESSIONS_COLLECTION, VALID_REGIONS,
};
pub use service::{ListSessionsQuery, SessionPage, SessionService};
pub use validation::{
    parse_limit, parse_offset, validate_limit, validate_offset, validate_region,
    validate_session_id, validate_status,
};
