use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A scalar column value. Covers the kinds seen across the backends this
/// crate talks to: embedded SQL, remote SQL, and document stores with
/// partition/sort keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Timestamp(t) => t.timestamp_nanos_opt().unwrap_or(0).hash(state),
            Value::Null => 0i8.hash(state),
        }
    }
}

impl Value {
    /// Compare two last-modified values under the rule that a missing or
    /// null value is the minimum possible value (spec §3).
    pub fn cmp_lm(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            // Mixed-variant last-modified columns are a configuration smell,
            // not something the Diff Engine tries to reconcile; fall back to
            // a stable textual comparison so the engine stays total.
            (a, b) => a.to_comparable_string().cmp(&b.to_comparable_string()),
        }
    }

    fn to_comparable_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Timestamp(t) => t.to_rfc3339(),
            Value::Null => String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_minimum() {
        assert_eq!(Value::Null.cmp_lm(&Value::Integer(0)), Ordering::Less);
        assert_eq!(Value::Integer(0).cmp_lm(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.cmp_lm(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn integers_compare_numerically() {
        assert_eq!(Value::Integer(10).cmp_lm(&Value::Integer(20)), Ordering::Less);
    }
}
