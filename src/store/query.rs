//! Collection queries and their evaluation.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::Document;

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering clause of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection.
///
/// Built with chained calls, then handed to a [`DocumentStore`](super::DocumentStore):
///
/// ```
/// use serde_json::json;
/// use session_api::store::{Direction, Query};
///
/// let query = Query::collection("sessions")
///     .where_eq("region", json!("us-east"))
///     .order_by("createdAt", Direction::Descending)
///     .limit(10);
///
/// assert_eq!(query.collection_name(), "sessions");
/// assert_eq!(query.limit_value(), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filters: Vec<(String, Value)>,
    order_by: Option<OrderBy>,
    limit: Option<usize>,
    start_after: Option<Document>,
}

impl Query {
    /// Start a query over every document in `collection`.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
            start_after: None,
        }
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push((field.into(), value));
        self
    }

    /// Order results by `field`. Ties are broken by document id.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Return at most `limit` documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after `cursor`'s position in the query order.
    pub fn start_after(mut self, cursor: Document) -> Self {
        self.start_after = Some(cursor);
        self
    }

    /// Same filters and ordering, without limit or cursor.
    pub fn without_window(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            limit: None,
            start_after: None,
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn cursor(&self) -> Option<&Document> {
        self.start_after.as_ref()
    }

    /// Whether a document satisfies every equality filter.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| document.field(field) == Some(expected))
    }

    /// Evaluate the query against a full collection scan.
    ///
    /// Filters, sorts, skips everything up to and including the cursor, then
    /// truncates to the limit.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(doc))
            .collect();

        matched.sort_by(|a, b| self.compare(a, b));

        if let Some(cursor) = &self.start_after {
            matched.retain(|doc| self.compare(doc, cursor) == Ordering::Greater);
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }

        matched
    }

    /// Position of `a` relative to `b` in this query's order.
    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match &self.order_by {
            Some(order) => {
                let ordering = compare_values(a.field(&order.field), b.field(&order.field))
                    .then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
            None => a.id.cmp(&b.id),
        }
    }
}

/// Compare two field values the way the store orders them.
///
/// Missing values sort first. RFC 3339 timestamps compare chronologically,
/// numbers numerically and other strings lexicographically. Values of
/// different kinds order by kind.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::String(a), Value::String(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => a.cmp(b),
            },
            (Value::Number(a), Value::Number(b)) => {
                let a = a.as_f64().unwrap_or(0.0);
                let b = b.as_f64().unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
