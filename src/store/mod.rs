mod memory;
mod mysql;
mod sqlite;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;

use std::collections::HashSet;

use crate::error::ConnectError;
use crate::row::{Row, Table};

/// Uniform per-backend surface the Diff Engine and Syncer consume (spec
/// §4.1). Backends seen in the retrieval pack: embedded SQL (file-backed),
/// remote SQL, and a document store with partition/sort keys; any backend
/// implementing this contract is acceptable.
///
/// `rows_update`/`rows_delete` key rows by `key_column`: update overwrites
/// all other columns of the row whose key matches, delete removes rows
/// whose key matches any input row's key. Non-matching input rows are a
/// no-op for `rows_update`, per spec §4.1.
pub trait TableStore {
    fn connect(&mut self) -> Result<(), ConnectError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    fn list_tables(&self) -> Result<HashSet<String>, ConnectError>;
    fn read_table(&self, table_name: &str) -> Result<Table, ConnectError>;

    fn rows_insert(&mut self, table_name: &str, rows: &[Row]) -> Result<(), ConnectError>;
    fn rows_update(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError>;
    fn rows_delete(
        &mut self,
        table_name: &str,
        rows: &[Row],
        key_column: &str,
    ) -> Result<(), ConnectError>;
}

/// Construct the adapter selected by an endpoint's `db_type` (spec §4.2:
/// "the backend kind selects a Table Store adapter; the config is opaque
/// to the core"). `Generic` endpoints build an empty `MemoryStore`; the
/// caller is expected to populate it via `MemoryStore::set_table` before
/// connecting, e.g. when rows were already read in from a CSV directory or
/// Google Sheet by an external collaborator.
pub fn from_endpoint_spec(spec: &crate::config::EndpointSpec) -> Box<dyn TableStore> {
    use crate::config::EndpointSpec;
    match spec {
        EndpointSpec::Sqlite { path } => Box::new(SqliteStore::new(path.clone())),
        EndpointSpec::Mysql {
            credentials_path,
            database,
        } => Box::new(MySqlStore::new(credentials_path.clone(), database.clone())),
        EndpointSpec::Generic { .. } => Box::new(MemoryStore::new()),
    }
}
