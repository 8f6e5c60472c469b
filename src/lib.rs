//! Two-endpoint table synchronizer: reconciles a MASTER dataset with a
//! SLAVE dataset for a configured set of tables by computing a minimal set
//! of row-level edits and applying them transactionally per side.

pub mod config;
pub mod diff;
pub mod editset;
pub mod error;
pub mod row;
pub mod store;
pub mod syncer;
pub mod value;

pub use config::{load as load_config, load_or_empty as load_config_or_empty, SyncSpec};
pub use editset::{EditSet, Role, SideEdits};
pub use error::SyncerError;
pub use row::{Row, Table};
pub use store::TableStore;
pub use syncer::{ConnectTarget, Status, Syncer};
pub use value::Value;
