//! Persisted settings

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use workflow_api::SettingLookup;

use crate::error::Result;
use crate::store::IntegrationLedger;

impl IntegrationLedger {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now()],
        )?;
        Ok(())
    }

    /// Returns whether the setting existed
    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

impl SettingLookup for IntegrationLedger {
    fn lookup(&self, key: &str) -> Option<String> {
        match self.get_setting(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read setting '{}': {}", key, e);
                None
            }
        }
    }
}
