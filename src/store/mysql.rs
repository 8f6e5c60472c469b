use std::collections::HashSet;
use std::fs;

use serde::Deserialize;

use crate::error::ConnectError;
use crate::row::{Row, Table};

use super::TableStore;

/// Credentials document shape, grounded in the original Python tool's
/// `mysql.py` (`PATH_MYSQL_CRED` / `MYSQL_CREDENTIALS` with `database`,
/// `login`, `username`, `password`).
#[derive(Debug, Deserialize)]
struct MysqlCredentials {
    database: String,
    login: String,
    username: String,
    password: String,
}

/// Remote SQL adapter. Credential loading mirrors the original's
/// `mysql.py::load_config`; the actual wire connection is intentionally
/// left unwired (see DESIGN.md) since this workspace's dependency set does
/// not carry a MySQL driver crate — adding one without a concrete need
/// would violate the "never fabricate dependencies" rule.
pub struct MySqlStore {
    credentials_path: String,
    database_override: Option<String>,
    connected: bool,
}

impl MySqlStore {
    pub fn new(credentials_path: impl Into<String>, database_override: Option<String>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            database_override,
            connected: false,
        }
    }

    fn load_credentials(&self) -> Result<MysqlCredentials, ConnectError> {
        let text = fs::read_to_string(&self.credentials_path).map_err(|e| {
            ConnectError::Other(format!(
                "reading mysql credentials at {}: {e}",
                self.credentials_path
            ))
        })?;
        let mut creds: MysqlCredentials = serde_json::from_str(&text)
            .map_err(|e| ConnectError::Other(format!("parsing mysql credentials: {e}")))?;
        if let Some(db) = &self.database_override {
            creds.database = db.clone();
        }
        Ok(creds)
    }
}

impl TableStore for MySqlStore {
    fn connect(&mut self) -> Result<(), ConnectError> {
        let creds = self.load_credentials()?;
        log::info!(
            "mysql backend selected for database '{}' (login template '{}', user '{}')",
            creds.database,
            creds.login,
            creds.username
        );
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "no MySQL driver crate is wired into this build; credentials loaded ok"
                .to_string(),
        })
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn list_tables(&self) -> Result<HashSet<String>, ConnectError> {
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "list_tables".to_string(),
        })
    }

    fn read_table(&self, _table_name: &str) -> Result<Table, ConnectError> {
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "read_table".to_string(),
        })
    }

    fn rows_insert(&mut self, _table_name: &str, _rows: &[Row]) -> Result<(), ConnectError> {
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "rows_insert".to_string(),
        })
    }

    fn rows_update(
        &mut self,
        _table_name: &str,
        _rows: &[Row],
        _key_column: &str,
    ) -> Result<(), ConnectError> {
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "rows_update".to_string(),
        })
    }

    fn rows_delete(
        &mut self,
        _table_name: &str,
        _rows: &[Row],
        _key_column: &str,
    ) -> Result<(), ConnectError> {
        Err(ConnectError::NotWired {
            backend: "mysql",
            role: "endpoint",
            detail: "rows_delete".to_string(),
        })
    }
}
