//! Installed node packages as tracked by the host
//!
//! Not authoritative: the engine's own database decides what is loaded. Rows
//! are keyed by package name, case-insensitively, and never deleted here.
//!
//! `needs_restart` is set by a fresh install and only cleared when an operator
//! acknowledges the restart. Re-installs and background registration leave it
//! as it is.

use chrono::Utc;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::IntegrationLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledNodePackage {
    pub package_name: String,
    pub version: Option<String>,
    pub node_types: Option<Vec<String>>,
    /// Installed on disk but the engine has not reloaded its node registry
    pub needs_restart: bool,
}

impl IntegrationLedger {
    /// Record a successful install.
    ///
    /// `fresh` is true when npm added the package (as opposed to finding it
    /// already installed). `None` for `version` or `node_types` keeps what
    /// was recorded before.
    pub fn record_install(
        &self,
        package_name: &str,
        version: Option<&str>,
        node_types: Option<&[String]>,
        fresh: bool,
    ) -> Result<InstalledNodePackage> {
        let node_types = node_types.map(serde_json::to_string).transpose()?;
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO installed_node_packages
                   (package_name, version, node_types, needs_restart, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(package_name) DO UPDATE SET
                   version = COALESCE(excluded.version, version),
                   node_types = COALESCE(excluded.node_types, node_types),
                   needs_restart = needs_restart OR excluded.needs_restart,
                   updated_at = excluded.updated_at",
                params![package_name, version, node_types, fresh, Utc::now()],
            )?;
        }
        self.require_package(package_name)
    }

    /// Store what background registration discovered.
    pub fn record_registration(
        &self,
        package_name: &str,
        version: Option<&str>,
        node_types: &[String],
    ) -> Result<InstalledNodePackage> {
        let node_types = if node_types.is_empty() {
            None
        } else {
            Some(node_types)
        };
        self.record_install(package_name, version, node_types, false)
    }

    /// Clear `needs_restart` after the engine was restarted.
    ///
    /// Returns the updated package, or `None` if it is not tracked.
    pub fn acknowledge_restart(&self, package_name: &str) -> Result<Option<InstalledNodePackage>> {
        let updated = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE installed_node_packages SET needs_restart = 0, updated_at = ?2
                 WHERE package_name = ?1",
                params![package_name, Utc::now()],
            )?
        };
        if updated == 0 {
            return Ok(None);
        }
        self.find_package(package_name)
    }

    pub fn list_installed(&self) -> Result<Vec<InstalledNodePackage>> {
        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT package_name, version, node_types, needs_restart
                 FROM installed_node_packages ORDER BY package_name",
            )?;
            let rows = stmt.query_map([], raw_package)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        rows.into_iter().map(RawPackage::decode).collect()
    }

    pub fn find_package(&self, package_name: &str) -> Result<Option<InstalledNodePackage>> {
        let raw = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT package_name, version, node_types, needs_restart
                 FROM installed_node_packages WHERE package_name = ?1",
            )?;
            let mut rows = stmt.query_map(params![package_name], raw_package)?;
            let first = rows.next().transpose()?;
            first
        };
        raw.map(RawPackage::decode).transpose()
    }

    fn require_package(&self, package_name: &str) -> Result<InstalledNodePackage> {
        self.find_package(package_name)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows.into())
    }
}

struct RawPackage {
    package_name: String,
    version: Option<String>,
    node_types: Option<String>,
    needs_restart: bool,
}

fn raw_package(row: &Row<'_>) -> rusqlite::Result<RawPackage> {
    Ok(RawPackage {
        package_name: row.get(0)?,
        version: row.get(1)?,
        node_types: row.get(2)?,
        needs_restart: row.get(3)?,
    })
}

impl RawPackage {
    fn decode(self) -> Result<InstalledNodePackage> {
        Ok(InstalledNodePackage {
            package_name: self.package_name,
            version: self.version,
            node_types: self
                .node_types
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            needs_restart: self.needs_restart,
        })
    }
}
