use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "dbsync_config.json";

/// Which side wins when two snapshots tie on last_modified but disagree on
/// non-key columns (open question in spec §9; this crate's default is
/// `Error`, matching the spec's stated default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TieBreaker {
    Master,
    Slave,
    #[default]
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub table_name: String,
    pub key: String,
    pub last_modified: String,
    #[serde(default)]
    pub tie_breaker: TieBreaker,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "db_type")]
pub enum EndpointSpec {
    Sqlite { path: String },
    Mysql {
        credentials_path: String,
        #[serde(default)]
        database: Option<String>,
    },
    Generic {
        #[serde(default)]
        config: serde_json::Value,
    },
}

impl EndpointSpec {
    pub fn db_type(&self) -> &'static str {
        match self {
            EndpointSpec::Sqlite { .. } => "sqlite",
            EndpointSpec::Mysql { .. } => "mysql",
            EndpointSpec::Generic { .. } => "generic",
        }
    }
}

/// (master EndpointSpec, slave EndpointSpec, ordered list of TableSpec) per
/// spec §3. `tables` order is the file's key order in `tables`, preserved
/// via `serde_json`'s `preserve_order` feature.
#[derive(Debug, Clone, Default)]
pub struct SyncSpec {
    pub master: Option<EndpointSpec>,
    pub slave: Option<EndpointSpec>,
    pub tables: Vec<TableSpec>,
}

impl SyncSpec {
    pub fn is_empty(&self) -> bool {
        self.master.is_none() && self.slave.is_none() && self.tables.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawTableEntry {
    key: String,
    last_modified: String,
    #[serde(default)]
    tie_breaker: TieBreaker,
}

#[derive(Debug, Deserialize)]
struct RawSyncSpec {
    #[serde(default)]
    master: Option<EndpointSpec>,
    #[serde(default)]
    slave: Option<EndpointSpec>,
    #[serde(default)]
    tables: serde_json::Map<String, serde_json::Value>,
}

/// Load a sync configuration document from `path`. Per spec §4.2, an
/// absent or unparseable file yields the empty `SyncSpec` rather than an
/// error — the Syncer treats this as a no-op sync.
pub fn load_or_empty(path: impl AsRef<Path>) -> SyncSpec {
    match load(path) {
        Ok(spec) => spec,
        Err(e) => {
            log::warn!("sync configuration not usable, falling back to empty spec: {e}");
            SyncSpec::default()
        }
    }
}

/// Load and strictly validate a sync configuration document from `path`.
/// Used by the CLI `config` verb, which must surface a diagnostic on
/// failure (spec §6).
pub fn load(path: impl AsRef<Path>) -> Result<SyncSpec, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|_| ConfigError::NotFound(path.display().to_string()))?;
    let raw: RawSyncSpec = serde_json::from_str(&text)?;

    let mut tables = Vec::with_capacity(raw.tables.len());
    for (table_name, entry) in raw.tables.into_iter() {
        let entry: RawTableEntry = serde_json::from_value(entry)?;
        tables.push(TableSpec {
            table_name,
            key: entry.key,
            last_modified: entry.last_modified,
            tie_breaker: entry.tie_breaker,
        });
    }

    Ok(SyncSpec {
        master: raw.master,
        slave: raw.slave,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_empty_spec() {
        let spec = load_or_empty("/nonexistent/path/dbsync_config.json");
        assert!(spec.is_empty());
    }

    #[test]
    fn preserves_table_order() {
        let mut file = tempfile_with(
            r#"{
  "master": {"db_type": "sqlite", "path": "m.db"},
  "slave":  {"db_type": "sqlite", "path": "s.db"},
  "tables": {
    "zebra": {"key": "id", "last_modified": "t"},
    "alpha": {"key": "id", "last_modified": "t"}
  }
}"#,
        );
        let spec = load(file.path()).expect("should parse");
        assert_eq!(spec.tables.len(), 2);
        assert_eq!(spec.tables[0].table_name, "zebra");
        assert_eq!(spec.tables[1].table_name, "alpha");
        file.flush().ok();
    }

    fn tempfile_with(contents: &str) -> NamedTempFileLike {
        NamedTempFileLike::new(contents)
    }

    // Minimal stand-in for a temp file so this module has no dev-dependency
    // on a tempfile crate the teacher never pulled in.
    struct NamedTempFileLike {
        path: std::path::PathBuf,
    }

    impl NamedTempFileLike {
        fn new(contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!("table_sync_test_{}.json", std::process::id()));
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            NamedTempFileLike { path }
        }

        fn path(&self) -> &std::path::Path {
            &self.path
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Drop for NamedTempFileLike {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }
}
