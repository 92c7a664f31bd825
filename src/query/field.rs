use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::collate::compare_text;

/// A single column value as seen by filtering, sorting and cell rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Integer(_) | FieldValue::Real(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Timestamp(_) => 3,
        }
    }

    /// Total order used by in-memory sorting. Nulls sort first, then numbers, text and
    /// timestamps, matching SQLite's storage-class ordering. Text ignores case.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Real(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Real(a), FieldValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Real(a), FieldValue::Real(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => compare_text(a, b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Case-insensitive substring test. `needle_lower` must already be lowercased.
    pub fn contains_ci(&self, needle_lower: &str) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Text(s) => s.to_lowercase().contains(needle_lower),
            other => other.to_string().to_lowercase().contains(needle_lower),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Real(r) => write!(f, "{r}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Real(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// Anything a table can list: exposes named fields to the query handles and the
/// table view. Unknown field names yield `None`.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Rows decoded from a JSON page payload on the client side.
impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).map(FieldValue::from)
    }
}
