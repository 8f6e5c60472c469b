//! Pure diff engine: given two table snapshots, compute the minimal set of
//! row-level edits that bring both sides into agreement (spec §4.3).
//!
//! This is a direct generalization of the original Python tool's
//! `merge_edits` (a pandas outer-join over `key`/`last_modified`) into a
//! typed, allocation-conscious Rust pass over `Vec<Row>` snapshots.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::TieBreaker;
use crate::editset::EditSet;
use crate::error::DiffError;
use crate::row::{column_set, Row, Table};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MostRecent {
    Master,
    Slave,
    None,
}

/// Diff two snapshots of the same table. `key_col` and `lm_col` name the
/// key column and last-modified column respectively.
pub fn diff_tables(
    table: &str,
    master: &Table,
    slave: &Table,
    key_col: &str,
    lm_col: &str,
    tie_breaker: TieBreaker,
) -> Result<EditSet, DiffError> {
    // Step 1: trivial cases.
    if master.is_empty() && slave.is_empty() {
        return Ok(EditSet::default());
    }
    if !master.is_empty() && slave.is_empty() {
        let mut edits = EditSet::default();
        edits.slave.insert = master.clone();
        return Ok(edits);
    }
    if master.is_empty() && !slave.is_empty() {
        let mut edits = EditSet::default();
        edits.master.insert = slave.clone();
        return Ok(edits);
    }

    check_schema(table, master, slave)?;
    let master_index = index_by_key(table, master, key_col, "master")?;
    let slave_index = index_by_key(table, slave, key_col, "slave")?;

    let global_master_lm = max_lm(master, lm_col);
    let global_slave_lm = max_lm(slave, lm_col);

    let mut all_keys: Vec<&Value> = master_index.keys().collect();
    for k in slave_index.keys() {
        if !master_index.contains_key(k) {
            all_keys.push(k);
        }
    }

    let mut edits = EditSet::default();

    for key in all_keys {
        let m_idx = master_index.get(key).copied();
        let s_idx = slave_index.get(key).copied();
        let exists_master = m_idx.is_some();
        let exists_slave = s_idx.is_some();

        let most_recent = match (m_idx, s_idx) {
            (Some(mi), Some(si)) => {
                let lm_m = master[mi].get(lm_col).unwrap_or(&Value::Null);
                let lm_s = slave[si].get(lm_col).unwrap_or(&Value::Null);
                match lm_m.cmp_lm(lm_s) {
                    Ordering::Greater => MostRecent::Master,
                    Ordering::Less => MostRecent::Slave,
                    Ordering::Equal => {
                        if master[mi] == slave[si] {
                            MostRecent::None
                        } else {
                            match tie_breaker {
                                TieBreaker::Master => MostRecent::Master,
                                TieBreaker::Slave => MostRecent::Slave,
                                TieBreaker::Error => {
                                    return Err(DiffError::TieConflict {
                                        table: table.to_string(),
                                        key: key.to_string(),
                                    })
                                }
                            }
                        }
                    }
                }
            }
            (Some(mi), None) => {
                let lm_m = master[mi].get(lm_col).unwrap_or(&Value::Null);
                if lm_m.cmp_lm(&global_slave_lm) != Ordering::Less {
                    MostRecent::Master
                } else {
                    MostRecent::Slave
                }
            }
            (None, Some(si)) => {
                let lm_s = slave[si].get(lm_col).unwrap_or(&Value::Null);
                if lm_s.cmp_lm(&global_master_lm) != Ordering::Less {
                    MostRecent::Slave
                } else {
                    MostRecent::Master
                }
            }
            (None, None) => unreachable!("key present in union of both indices"),
        };

        // Step 3: rule table.
        match (exists_master, exists_slave, most_recent) {
            (false, true, MostRecent::Slave) => {
                edits.master.insert.push(slave[s_idx.unwrap()].clone());
            }
            (false, true, MostRecent::Master) => {
                edits.slave.delete.push(slave[s_idx.unwrap()].clone());
            }
            (true, false, MostRecent::Slave) | (true, false, MostRecent::Master) => {
                // Master-only row. Whether the global slave clock was ahead
                // (conservative default: re-insert on the slave rather than
                // delete on the master, spec §4.3 step 3 note) or the row is
                // simply a fresh master-side insertion, the destination and
                // edit are the same: insert into the slave.
                edits.slave.insert.push(master[m_idx.unwrap()].clone());
            }
            (true, true, MostRecent::Slave) => {
                edits.master.update.push(slave[s_idx.unwrap()].clone());
            }
            (true, true, MostRecent::Master) => {
                edits.slave.update.push(master[m_idx.unwrap()].clone());
            }
            (_, _, MostRecent::None) => {
                // No edit: both sides already agree.
            }
            (false, false, _) => {
                unreachable!("key drawn from the union of both snapshots' indices")
            }
        }
    }

    Ok(edits)
}

fn check_schema(table: &str, master: &Table, slave: &Table) -> Result<(), DiffError> {
    let master_cols = column_set(master);
    let slave_cols = column_set(slave);
    if master_cols != slave_cols {
        return Err(DiffError::SchemaMismatch {
            table: table.to_string(),
            master_cols,
            slave_cols,
        });
    }
    Ok(())
}

fn index_by_key<'a>(
    table: &str,
    rows: &'a [Row],
    key_col: &str,
    side: &'static str,
) -> Result<HashMap<Value, usize>, DiffError> {
    let mut index = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let key = row.key_value(key_col);
        if index.insert(key.clone(), i).is_some() {
            return Err(DiffError::DuplicateKey {
                table: table.to_string(),
                side,
                key: key.to_string(),
            });
        }
    }
    Ok(index)
}

fn max_lm(rows: &[Row], lm_col: &str) -> Value {
    rows.iter()
        .map(|r| r.get(lm_col).cloned().unwrap_or(Value::Null))
        .max_by(|a, b| a.cmp_lm(b))
        .unwrap_or(Value::Null)
}
