//! Query string parsing for the session endpoints.
//!
//! Parameters are read from the raw query with `form_urlencoded` instead of
//! a typed extractor. Parsing never fails: repeated names and malformed
//! values are handed to the validation layer, which answers with the
//! standard error envelope.

use std::borrow::Cow;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use url::form_urlencoded;

/// Every `name=value` pair of a query string, in order, repeats kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

/// One parameter as seen by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue<'a> {
    /// Not in the query string
    Absent,

    /// Given exactly once (possibly empty)
    One(&'a str),

    /// Given more than once
    Many(Vec<&'a str>),
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Look up `name`.
    pub fn get(&self, name: &str) -> QueryValue<'_> {
        let mut values: Vec<&str> = self
            .pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect();

        match values.len() {
            0 => QueryValue::Absent,
            1 => QueryValue::One(values.remove(0)),
            _ => QueryValue::Many(values),
        }
    }
}

impl<'a> QueryValue<'a> {
    /// The value if it was given once and is non-empty.
    ///
    /// A repeated parameter is not a single string and yields `None`.
    pub fn single(&self) -> Option<&'a str> {
        match self {
            QueryValue::One(value) if !value.is_empty() => Some(*value),
            _ => None,
        }
    }

    /// Input for an optional filter.
    ///
    /// `None` means no filter was requested (absent or empty). `Some(None)`
    /// is a repeated parameter, which validation rejects as not a string.
    pub fn filter_input(&self) -> Option<Option<&'a str>> {
        match self {
            QueryValue::Absent => None,
            QueryValue::One(value) if value.is_empty() => None,
            QueryValue::One(value) => Some(Some(*value)),
            QueryValue::Many(_) => Some(None),
        }
    }

    /// Raw text for numeric parsing.
    ///
    /// Repeated values are joined with `,`, which never parses as a number.
    pub fn raw(&self) -> Option<Cow<'a, str>> {
        match self {
            QueryValue::Absent => None,
            QueryValue::One(value) => Some(Cow::Borrowed(*value)),
            QueryValue::Many(values) => Some(Cow::Owned(values.join(","))),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or("")))
    }
}
