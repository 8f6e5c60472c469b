use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A mapping from column name to scalar value. Rows within one table share
/// a column set (spec §3); column order is kept sorted so two rows can be
/// compared for schema equality without depending on field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Row(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Row(map)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Value of the key column, or `Value::Null` if the row does not carry
    /// that column at all.
    pub fn key_value(&self, key_col: &str) -> Value {
        self.0.get(key_col).cloned().unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.0.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// An ordered sequence of Rows produced by reading a named table at one
/// instant. Row order is not semantically meaningful (spec §3); callers
/// may rely on positional index only within a single snapshot.
pub type Table = Vec<Row>;

/// Schema (column set) of a non-empty table snapshot, used for the
/// column-mismatch check between two snapshots of the same table.
pub fn column_set(table: &Table) -> Vec<String> {
    let mut cols: Vec<String> = table
        .first()
        .map(|r| r.columns().into_iter().map(str::to_string).collect())
        .unwrap_or_default();
    cols.sort();
    cols
}
