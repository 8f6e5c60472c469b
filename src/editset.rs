use serde::{Deserialize, Serialize};

use crate::row::Row;

/// The three mutation kinds a side can receive in one table's EditSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideEdits {
    pub delete: Vec<Row>,
    pub update: Vec<Row>,
    pub insert: Vec<Row>,
}

impl SideEdits {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// A two-by-three structure describing the rows to insert/update/delete on
/// each side for one table (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditSet {
    pub master: SideEdits,
    pub slave: SideEdits,
}

impl EditSet {
    pub fn is_empty(&self) -> bool {
        self.master.is_empty() && self.slave.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Slave => "slave",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
