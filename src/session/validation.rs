//! Request validation.
//!
//! Every handler input passes through these functions before it reaches the
//! session service. Each one either returns the (possibly defaulted) value
//! or an [`ApiError::Validation`] with a message meant for API consumers.

use crate::error::ApiError;

use super::model::{
    SessionStatus, DEFAULT_LIMIT, DEFAULT_OFFSET, MAX_LIMIT, MIN_LIMIT, VALID_REGIONS,
};

/// Treat missing and blank inputs the same way.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Check that `region` is one of [`VALID_REGIONS`].
pub fn validate_region(region: Option<&str>) -> Result<(), ApiError> {
    let region = non_blank(region).ok_or_else(|| {
        ApiError::validation("Region is required and must be a non-empty string")
    })?;

    if !VALID_REGIONS.contains(&region) {
        return Err(ApiError::validation(format!(
            "Invalid region. Must be one of: {}",
            VALID_REGIONS.join(", ")
        )));
    }

    Ok(())
}

/// Check that `status` names a [`SessionStatus`] and return it.
pub fn validate_status(status: Option<&str>) -> Result<SessionStatus, ApiError> {
    let status = non_blank(status)
        .ok_or_else(|| ApiError::validation("Status is required and must be a string"))?;

    status.parse().map_err(|_| {
        let names: Vec<&str> = SessionStatus::ALL.iter().map(|s| s.as_str()).collect();
        ApiError::validation(format!(
            "Invalid status. Must be one of: {}",
            names.join(", ")
        ))
    })
}

/// Check that a session id was supplied. Existence is checked by the store.
pub fn validate_session_id(session_id: Option<&str>) -> Result<(), ApiError> {
    non_blank(session_id)
        .map(|_| ())
        .ok_or_else(|| ApiError::validation("Session ID is required and must be a non-empty string"))
}

fn limit_error() -> ApiError {
    ApiError::validation(format!(
        "Limit must be a number between {} and {}",
        MIN_LIMIT, MAX_LIMIT
    ))
}

fn offset_error() -> ApiError {
    ApiError::validation("Offset must be a non-negative number")
}

/// Default an absent limit, reject one outside `MIN_LIMIT..=MAX_LIMIT`.
pub fn validate_limit(limit: Option<i64>) -> Result<usize, ApiError> {
    let Some(limit) = limit else {
        return Ok(DEFAULT_LIMIT);
    };

    usize::try_from(limit)
        .ok()
        .filter(|l| (MIN_LIMIT..=MAX_LIMIT).contains(l))
        .ok_or_else(limit_error)
}

/// Default an absent offset, reject a negative one.
pub fn validate_offset(offset: Option<i64>) -> Result<usize, ApiError> {
    let Some(offset) = offset else {
        return Ok(DEFAULT_OFFSET);
    };

    usize::try_from(offset).map_err(|_| offset_error())
}

/// Read an optional integer query value. Empty strings count as absent.
fn parse_integer(raw: Option<&str>) -> Result<Option<i64>, ()> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| ()),
    }
}

/// Validate a raw `limit` query value.
pub fn parse_limit(raw: Option<&str>) -> Result<usize, ApiError> {
    let limit = parse_integer(raw).map_err(|_| limit_error())?;
    validate_limit(limit)
}

/// Validate a raw `offset` query value.
pub fn parse_offset(raw: Option<&str>) -> Result<usize, ApiError> {
    let offset = parse_integer(raw).map_err(|_| offset_error())?;
    validate_offset(offset)
}
