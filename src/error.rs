use thiserror::Error;

/// Sync phase in which an apply error occurred, carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Delete,
    Update,
    Insert,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Delete => "delete",
            Phase::Update => "update",
            Phase::Insert => "insert",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),
    #[error("config file is not valid JSON: {0}")]
    Unparseable(#[from] serde_json::Error),
    #[error("unknown db_type: {0}")]
    UnknownBackend(String),
    #[error("table '{0}' is missing required field '{1}'")]
    MissingField(String, &'static str),
}

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{backend} backend for role {role} is not wired: {detail}")]
    NotWired {
        backend: &'static str,
        role: &'static str,
        detail: String,
    },
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("duplicate key {key:?} found in {side} snapshot of table '{table}'")]
    DuplicateKey {
        table: String,
        side: &'static str,
        key: String,
    },
    #[error("column mismatch between master and slave snapshots of table '{table}': master has {master_cols:?}, slave has {slave_cols:?}")]
    SchemaMismatch {
        table: String,
        master_cols: Vec<String>,
        slave_cols: Vec<String>,
    },
    #[error("key {key:?} in table '{table}' ties on last_modified but differs in content; tie_breaker is Error")]
    TieConflict { table: String, key: String },
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("applying {phase} to {role} side of table '{table}' failed: {source}")]
    Adapter {
        table: String,
        role: &'static str,
        phase: Phase,
        #[source]
        source: ConnectError,
    },
}

/// Top-level error type returned by `Syncer` operations.
#[derive(Error, Debug)]
pub enum SyncerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("table '{table}': {source}")]
    Diff {
        table: String,
        #[source]
        source: DiffError,
    },
    #[error(transparent)]
    Apply(#[from] ApplyError),
}
