use std::collections::{HashMap, HashSet};

use crate::error::ConnectError;
use crate::row::{Row, Table};
use crate::value::Value;

use super::TableStore;

/// In-process Table Store backed by a `HashMap`. This is the Rust analogue
/// of the original Python tool's CSV-directory and Sheets readers: those
/// hand the sync core whole snapshots without owning a persistent
/// connection of their own, which this adapter models directly by holding
/// tables already resident in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
    connected: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, rows: Table) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    pub fn set_table(&mut self, name: impl Into<String>, rows: Table) {
        self.tables.insert(name.into(), rows);
    }
}

impl TableStore for MemoryStore {
    fn connect(&mut self) -> Result<(), ConnectError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn list_tables(&self) -> Result<HashSet<String>, ConnectError> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn read_table(&self, table_name: &str) -> Result<Table, ConnectError> {
        Ok(self.tables.get(table_name).cloned().unwrap_or_default())
    }

    fn rows_insert(&mut self, table_name: &str, rows: &[Row]) -> Result<(), ConnectError> {
        self.tables
            .entry(table_name.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    fn rows_update(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError> {
        let table = self.tables.entry(table_name.to_string()).or_default();
        for incoming in rows {
            let key = incoming.key_value(key_column);
            if key == Value::Null {
                continue;
            }
            if let Some(existing) = table
                .iter_mut()
                .find(|r| r.key_value(key_column) == key)
            {
                *existing = incoming.clone();
            }
        }
        Ok(())
    }

    fn rows_delete(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError> {
        let keys: std::collections::HashSet<Value> =
            rows.iter().map(|r| r.key_value(key_column)).collect();
        if let Some(table) = self.tables.get_mut(table_name) {
            table.retain(|r| !keys.contains(&r.key_value(key_column)));
        }
        Ok(())
    }
}
