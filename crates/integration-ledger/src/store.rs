//! Connection handling and schema

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS purpose_assignments (
    purpose_key TEXT PRIMARY KEY NOT NULL,
    workflow_id TEXT NOT NULL,
    webhook_url TEXT,
    workflow_name TEXT NOT NULL,
    assigned_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS installed_node_packages (
    package_name TEXT PRIMARY KEY NOT NULL COLLATE NOCASE,
    version TEXT,
    node_types TEXT,
    needs_restart INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
"#;

/// SQLite-backed ledger shared by the host's request handlers
pub struct IntegrationLedger {
    pub(crate) conn: Mutex<Connection>,
}

impl IntegrationLedger {
    /// Open (creating if needed) the ledger at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("Opening integration ledger at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Ledger that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
