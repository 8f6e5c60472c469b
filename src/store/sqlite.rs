use std::collections::HashSet;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::error::ConnectError;
use crate::row::Row;
use crate::value::Value;

use super::TableStore;

/// Embedded SQL adapter, grounded directly in the teacher crate's own use
/// of `rusqlite::Connection` (`SyncConnHandle`/`SyncEngine::new`).
/// `read_table` discovers the row shape via `PRAGMA table_info` instead of
/// requiring a fixed schema, the same reflection-driven approach the
/// original Python tool takes with SQLAlchemy's `Inspector`.
pub struct SqliteStore {
    path: String,
    conn: Option<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    fn conn(&self) -> Result<&Connection, ConnectError> {
        self.conn
            .as_ref()
            .ok_or_else(|| ConnectError::Other("sqlite store is not connected".to_string()))
    }

    fn columns(&self, conn: &Connection, table_name: &str) -> Result<Vec<String>, ConnectError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table_name})"))?;
        let cols = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cols)
    }

    /// Test-only escape hatch for schema setup. The adapter contract has no
    /// `CREATE TABLE` operation (spec §1 non-goals: no schema migration);
    /// tests that need a table to exist before exercising `TableStore`
    /// reach through to the live connection directly, the same way the
    /// teacher's own FFI tests open a real `rusqlite::Connection` rather
    /// than mocking one.
    #[cfg(test)]
    pub(crate) fn test_create_schema(&self, sql: &str) {
        self.conn
            .as_ref()
            .expect("connect() before test_create_schema")
            .execute_batch(sql)
            .expect("test schema setup failed");
    }
}

fn sql_to_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

fn value_to_sql(v: &Value) -> rusqlite::types::Value {
    match v {
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        Value::Timestamp(t) => rusqlite::types::Value::Text(t.to_rfc3339()),
        Value::Null => rusqlite::types::Value::Null,
    }
}

impl TableStore for SqliteStore {
    fn connect(&mut self) -> Result<(), ConnectError> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = Connection::open(&self.path)?;
        self.conn = Some(conn);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.conn = None;
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn list_tables(&self) -> Result<HashSet<String>, ConnectError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    fn read_table(&self, table_name: &str) -> Result<crate::row::Table, ConnectError> {
        let conn = self.conn()?;
        let cols = self.columns(conn, table_name)?;
        let select_list = cols.join(", ");
        let mut stmt = conn.prepare(&format!("SELECT {select_list} FROM {table_name}"))?;
        let rows = stmt.query_map([], |sql_row| {
            let mut row = Row::new();
            for (idx, col) in cols.iter().enumerate() {
                let value = sql_to_value(sql_row.get_ref(idx)?);
                row.insert(col.clone(), value);
            }
            Ok(row)
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(ConnectError::from)
    }

    fn rows_insert(&mut self, table_name: &str, rows: &[Row]) -> Result<(), ConnectError> {
        if rows.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        for row in rows {
            let cols: Vec<&str> = row.columns();
            let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {table_name} ({}) VALUES ({})",
                cols.join(", "),
                placeholders.join(", ")
            );
            let params: Vec<rusqlite::types::Value> = cols
                .iter()
                .map(|c| value_to_sql(row.get(c).unwrap_or(&Value::Null)))
                .collect();
            tx.execute(&sql, rusqlite::params_from_iter(params))?;
        }
        tx.commit()?;
        Ok(())
    }

    fn rows_update(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError> {
        if rows.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        for row in rows {
            let key = match row.get(key_column) {
                Some(k) => k,
                None => continue,
            };
            let set_cols: Vec<&str> = row
                .columns()
                .into_iter()
                .filter(|c| *c != key_column)
                .collect();
            if set_cols.is_empty() {
                continue;
            }
            let assignments: Vec<String> = set_cols
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{c} = ?{}", i + 1))
                .collect();
            let sql = format!(
                "UPDATE {table_name} SET {} WHERE {key_column} = ?{}",
                assignments.join(", "),
                set_cols.len() + 1
            );
            let mut params: Vec<rusqlite::types::Value> = set_cols
                .iter()
                .map(|c| value_to_sql(row.get(c).unwrap_or(&Value::Null)))
                .collect();
            params.push(value_to_sql(key));
            tx.execute(&sql, rusqlite::params_from_iter(params))?;
        }
        tx.commit()?;
        Ok(())
    }

    fn rows_delete(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError> {
        if rows.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        {
            let sql = format!("DELETE FROM {table_name} WHERE {key_column} = ?1");
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                let key = row.key_value(key_column);
                stmt.execute([value_to_sql(&key)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_with_trips() -> SqliteStore {
        let mut store = SqliteStore::new(":memory:");
        store.connect().unwrap();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute_batch(
                "CREATE TABLE trips (id INTEGER PRIMARY KEY, t INTEGER, v TEXT);
                 INSERT INTO trips VALUES (1, 10, 'a');",
            )
            .unwrap();
        store
    }

    #[test]
    fn reads_rows_with_inferred_columns() {
        let store = open_with_trips();
        let table = store.read_table("trips").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].get("v"), Some(&Value::Text("a".to_string())));
    }

    #[test]
    fn insert_then_update_then_delete_roundtrip() {
        let mut store = open_with_trips();
        let mut new_row = Row::new();
        new_row.insert("id", Value::Integer(2));
        new_row.insert("t", Value::Integer(20));
        new_row.insert("v", Value::Text("b".to_string()));
        store.rows_insert("trips", &[new_row]).unwrap();
        assert_eq!(store.read_table("trips").unwrap().len(), 2);

        let mut updated = Row::new();
        updated.insert("id", Value::Integer(2));
        updated.insert("t", Value::Integer(99));
        updated.insert("v", Value::Text("b2".to_string()));
        store.rows_update("trips", &[updated], "id").unwrap();
        let table = store.read_table("trips").unwrap();
        let row2 = table.iter().find(|r| r.get("id") == Some(&Value::Integer(2))).unwrap();
        assert_eq!(row2.get("t"), Some(&Value::Integer(99)));

        let mut key_only = Row::new();
        key_only.insert("id", Value::Integer(2));
        store.rows_delete("trips", &[key_only], "id").unwrap();
        assert_eq!(store.read_table("trips").unwrap().len(), 1);
    }
}
