//! Orchestrator: owns the two endpoint connections, iterates tables in
//! scope, invokes the Diff Engine, optionally applies the resulting
//! EditSet, and maintains the Syncer status state machine (spec §4.4).
//!
//! This generalizes the teacher crate's `SyncClient::sync_cycle` (push
//! local changes, pull remote changes, apply through one `ApplyDomainOp`)
//! to two live connections diffed directly against each other instead of
//! reconciled through an oplog.

use std::collections::HashMap;

use crate::config::{SyncSpec, TableSpec};
use crate::diff::diff_tables;
use crate::editset::{EditSet, Role};
use crate::error::{ApplyError, DiffError, Phase, SyncerError};
use crate::store::TableStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Disconnected,
    Connected,
    Synced,
    PendingEdits,
    Error(String),
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Disconnected => write!(f, "disconnected"),
            Status::Connected => write!(f, "connected"),
            Status::Synced => write!(f, "synced"),
            Status::PendingEdits => write!(f, "pending edits"),
            Status::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectTarget {
    Master,
    Slave,
    Both,
}

pub struct Syncer {
    spec: SyncSpec,
    master: Box<dyn TableStore>,
    slave: Box<dyn TableStore>,
    status: Status,
    edits: HashMap<String, EditSet>,
}

impl Syncer {
    pub fn new(spec: SyncSpec, master: Box<dyn TableStore>, slave: Box<dyn TableStore>) -> Self {
        Self {
            spec,
            master,
            slave,
            status: Status::Disconnected,
            edits: HashMap::new(),
        }
    }

    /// Build a Syncer from a loaded `SyncSpec`, constructing each
    /// endpoint's adapter from its `db_type` (spec §4.2/§9: the backend
    /// dispatch and process-wide state are re-cast as an explicit,
    /// dependency-injected context owned by the Syncer, not a global).
    /// An absent endpoint falls back to an empty in-memory store, matching
    /// the "empty SyncSpec is a no-op sync" rule for a fully absent config.
    pub fn from_spec(spec: SyncSpec) -> Self {
        let master = spec
            .master
            .as_ref()
            .map(crate::store::from_endpoint_spec)
            .unwrap_or_else(|| Box::new(crate::store::MemoryStore::new()));
        let slave = spec
            .slave
            .as_ref()
            .map(crate::store::from_endpoint_spec)
            .unwrap_or_else(|| Box::new(crate::store::MemoryStore::new()));
        Self::new(spec, master, slave)
    }

    pub fn status(&self) -> Status {
        self.status.clone()
    }

    /// Open one or both endpoint connections (spec §4.4).
    pub fn connect(&mut self, target: ConnectTarget) -> Result<(), SyncerError> {
        let result = (|| -> Result<(), crate::error::ConnectError> {
            if matches!(target, ConnectTarget::Master | ConnectTarget::Both) {
                self.master.connect()?;
            }
            if matches!(target, ConnectTarget::Slave | ConnectTarget::Both) {
                self.slave.connect()?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                if self.master.is_connected() && self.slave.is_connected() {
                    self.status = Status::Connected;
                }
                Ok(())
            }
            Err(e) => {
                log::error!("connect failed: {e}");
                self.status = Status::Error(e.to_string());
                Err(SyncerError::Connect(e))
            }
        }
    }

    /// Release resources; transitions to Disconnected when both sides are
    /// down (spec §4.4).
    pub fn disconnect(&mut self, target: ConnectTarget) {
        if matches!(target, ConnectTarget::Master | ConnectTarget::Both) {
            self.master.disconnect();
        }
        if matches!(target, ConnectTarget::Slave | ConnectTarget::Both) {
            self.slave.disconnect();
        }
        if !self.master.is_connected() && !self.slave.is_connected() {
            self.status = Status::Disconnected;
        }
    }

    /// Predicate over the accumulated EditSets (spec §4.4).
    pub fn has_edits(&self, table: Option<&str>, role: Option<Role>) -> bool {
        let check_one = |edits: &EditSet| match role {
            Some(Role::Master) => !edits.master.is_empty(),
            Some(Role::Slave) => !edits.slave.is_empty(),
            None => !edits.is_empty(),
        };
        match table {
            Some(t) => self.edits.get(t).map(check_one).unwrap_or(false),
            None => self.edits.values().any(check_one),
        }
    }

    pub fn export_edits(&self) -> &HashMap<String, EditSet> {
        &self.edits
    }

    /// Run the full flow: connect, diff each table in scope, optionally
    /// apply the edits. Leaves status in Synced, PendingEdits, or Error
    /// (spec §4.4).
    pub fn sync(&mut self, apply_edits: bool, keep_connection: bool) -> Result<(), SyncerError> {
        if !matches!(self.status, Status::Connected | Status::PendingEdits) {
            self.connect(ConnectTarget::Both)?;
        }

        self.edits.clear();
        let mut any_edits = false;

        for table_spec in self.spec.tables.clone() {
            match self.sync_table(&table_spec, apply_edits) {
                Ok(had_edits) => {
                    any_edits = any_edits || had_edits;
                }
                Err(e) => {
                    log::error!("sync aborted at table '{}': {e}", table_spec.table_name);
                    self.status = Status::Error(e.to_string());
                    return Err(e);
                }
            }
        }

        self.status = if any_edits && !apply_edits {
            Status::PendingEdits
        } else {
            Status::Synced
        };

        if !keep_connection {
            self.disconnect(ConnectTarget::Both);
        }

        Ok(())
    }

    /// Diff and (optionally) apply edits for one table. Returns whether
    /// any edits were found.
    fn sync_table(&mut self, table_spec: &TableSpec, apply_edits: bool) -> Result<bool, SyncerError> {
        let master_snapshot = self
            .master
            .read_table(&table_spec.table_name)
            .map_err(SyncerError::Connect)?;
        let slave_snapshot = self
            .slave
            .read_table(&table_spec.table_name)
            .map_err(SyncerError::Connect)?;

        let edits = diff_tables(
            &table_spec.table_name,
            &master_snapshot,
            &slave_snapshot,
            &table_spec.key,
            &table_spec.last_modified,
            table_spec.tie_breaker,
        )
        .map_err(|source: DiffError| SyncerError::Diff {
            table: table_spec.table_name.clone(),
            source,
        })?;

        let had_edits = !edits.is_empty();
        if had_edits {
            self.edits.insert(table_spec.table_name.clone(), edits.clone());
        }

        if apply_edits && had_edits {
            // Master-side edits before slave-side edits for the same table,
            // to honor the authority rule (spec §4.4). Within a side:
            // delete, update, insert.
            apply_side(
                &mut *self.master,
                &table_spec.table_name,
                &table_spec.key,
                Role::Master,
                &edits.master,
            )?;
            apply_side(
                &mut *self.slave,
                &table_spec.table_name,
                &table_spec.key,
                Role::Slave,
                &edits.slave,
            )?;
            self.edits.remove(&table_spec.table_name);
        }

        Ok(had_edits)
    }
}

fn apply_side(
    store: &mut dyn TableStore,
    table: &str,
    key_col: &str,
    role: Role,
    side_edits: &crate::editset::SideEdits,
) -> Result<(), SyncerError> {
    if !side_edits.delete.is_empty() {
        store
            .rows_delete(table, &side_edits.delete, key_col)
            .map_err(|source| wrap_apply(table, role, Phase::Delete, source))?;
    }
    if !side_edits.update.is_empty() {
        store
            .rows_update(table, &side_edits.update, key_col)
            .map_err(|source| wrap_apply(table, role, Phase::Update, source))?;
    }
    if !side_edits.insert.is_empty() {
        store
            .rows_insert(table, &side_edits.insert)
            .map_err(|source| wrap_apply(table, role, Phase::Insert, source))?;
    }
    Ok(())
}

fn wrap_apply(
    table: &str,
    role: Role,
    phase: Phase,
    source: crate::error::ConnectError,
) -> SyncerError {
    SyncerError::Apply(ApplyError::Adapter {
        table: table.to_string(),
        role: role.as_str(),
        phase,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointSpec, TableSpec, TieBreaker};
    use crate::row::Row;
    use crate::store::MemoryStore;
    use crate::value::Value;

    fn row(id: i64, t: i64, v: &str) -> Row {
        let mut r = Row::new();
        r.insert("id", Value::Integer(id));
        r.insert("t", Value::Integer(t));
        r.insert("v", Value::Text(v.to_string()));
        r
    }

    fn spec_for(table: &str) -> SyncSpec {
        SyncSpec {
            master: Some(EndpointSpec::Generic {
                config: serde_json::Value::Null,
            }),
            slave: Some(EndpointSpec::Generic {
                config: serde_json::Value::Null,
            }),
            tables: vec![TableSpec {
                table_name: table.to_string(),
                key: "id".to_string(),
                last_modified: "t".to_string(),
                tie_breaker: TieBreaker::Error,
            }],
        }
    }

    #[test]
    fn s1_empty_sync_reports_synced() {
        let master = MemoryStore::new();
        let slave = MemoryStore::new();
        let mut syncer = Syncer::new(spec_for("trips"), Box::new(master), Box::new(slave));
        syncer.sync(true, false).unwrap();
        assert_eq!(syncer.status(), Status::Synced);
    }

    #[test]
    fn sync_then_idempotent_resync_s6() {
        let master =
            MemoryStore::new().with_table("trips", vec![row(1, 10, "a"), row(2, 30, "x")]);
        let slave = MemoryStore::new().with_table("trips", vec![row(1, 20, "b"), row(3, 25, "y")]);
        let mut syncer = Syncer::new(spec_for("trips"), Box::new(master), Box::new(slave));

        syncer.sync(true, false).unwrap();
        assert_eq!(syncer.status(), Status::Synced);
        assert!(!syncer.has_edits(None, None));

        // Re-run with apply=false against the same stores: no edits should
        // remain since both sides already converged.
        syncer.sync(false, false).unwrap();
        assert_eq!(syncer.status(), Status::Synced);
        assert!(!syncer.has_edits(None, None));
    }

    #[test]
    fn pending_edits_status_without_apply() {
        let master = MemoryStore::new().with_table("trips", vec![row(1, 10, "a")]);
        let slave = MemoryStore::new();
        let mut syncer = Syncer::new(spec_for("trips"), Box::new(master), Box::new(slave));
        syncer.sync(false, false).unwrap();
        assert_eq!(syncer.status(), Status::PendingEdits);
        assert!(syncer.has_edits(Some("trips"), Some(Role::Slave)));
    }

    /// End-to-end against two live `:memory:` SQLite connections rather
    /// than `MemoryStore` fixtures, matching the teacher's own habit of
    /// testing its connection-owning code against a real engine instead of
    /// a mock (spec §8 S5/S6).
    #[test]
    fn sqlite_end_to_end_s5_then_idempotent_resync() {
        use crate::store::SqliteStore;

        let schema = "CREATE TABLE trips (id INTEGER PRIMARY KEY, t INTEGER, v TEXT);";

        let mut master_store = SqliteStore::new(":memory:");
        master_store.connect().unwrap();
        master_store.test_create_schema(schema);
        master_store
            .rows_insert("trips", &[row(1, 10, "a"), row(2, 30, "x")])
            .unwrap();

        let mut slave_store = SqliteStore::new(":memory:");
        slave_store.connect().unwrap();
        slave_store.test_create_schema(schema);
        slave_store
            .rows_insert("trips", &[row(1, 20, "b"), row(3, 25, "y")])
            .unwrap();

        let mut syncer = Syncer::new(
            spec_for("trips"),
            Box::new(master_store),
            Box::new(slave_store),
        );

        syncer.sync(true, true).unwrap();
        assert_eq!(syncer.status(), Status::Synced);

        // Re-read both connections directly: both sides must agree as
        // multisets keyed by id, per spec §8 P1. id=3 (slave-only, stale
        // against the master's global last-modified) is a slave-side
        // deletion under the authority rule, not a master-side insert, so
        // the converged set is {id=1, id=2}.
        let master_rows = syncer.master.read_table("trips").unwrap();
        let slave_rows = syncer.slave.read_table("trips").unwrap();
        assert_eq!(master_rows.len(), 2);
        assert_eq!(slave_rows.len(), 2);
        for id in [1i64, 2] {
            let m = master_rows
                .iter()
                .find(|r| r.key_value("id") == Value::Integer(id))
                .unwrap();
            let s = slave_rows
                .iter()
                .find(|r| r.key_value("id") == Value::Integer(id))
                .unwrap();
            assert_eq!(m, s);
        }
        assert!(master_rows
            .iter()
            .all(|r| r.key_value("id") != Value::Integer(3)));
        assert!(slave_rows
            .iter()
            .all(|r| r.key_value("id") != Value::Integer(3)));

        // S6: re-running without applying must report Synced with no edits.
        syncer.sync(false, false).unwrap();
        assert_eq!(syncer.status(), Status::Synced);
        assert!(!syncer.has_edits(None, None));
    }
}
