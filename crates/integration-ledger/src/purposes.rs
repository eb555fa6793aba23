//! Workflow purpose assignments
//!
//! A purpose key (for example `lesson-chat`) names a job the platform hands to
//! a workflow. Each key maps to at most one workflow; assigning again replaces
//! the previous assignment.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::IntegrationLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeAssignment {
    pub purpose_key: String,
    pub workflow_id: String,
    /// Production webhook the platform calls for this purpose
    pub webhook_url: Option<String>,
    pub workflow_name: String,
    pub assigned_at: DateTime<Utc>,
}

impl PurposeAssignment {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            purpose_key: row.get(0)?,
            workflow_id: row.get(1)?,
            webhook_url: row.get(2)?,
            workflow_name: row.get(3)?,
            assigned_at: row.get(4)?,
        })
    }
}

const SELECT: &str = "SELECT purpose_key, workflow_id, webhook_url, workflow_name, assigned_at
                      FROM purpose_assignments";

impl IntegrationLedger {
    /// Assign `workflow_id` to `purpose_key`, replacing any previous workflow.
    pub fn assign_purpose(
        &self,
        purpose_key: &str,
        workflow_id: &str,
        webhook_url: Option<&str>,
        workflow_name: &str,
    ) -> Result<PurposeAssignment> {
        let assignment = PurposeAssignment {
            purpose_key: purpose_key.to_string(),
            workflow_id: workflow_id.to_string(),
            webhook_url: webhook_url.map(String::from),
            workflow_name: workflow_name.to_string(),
            assigned_at: Utc::now(),
        };

        let conn = self.conn.lock();
        let previous: Option<String> = conn
            .query_row(
                "SELECT workflow_id FROM purpose_assignments WHERE purpose_key = ?1",
                params![purpose_key],
                |row| row.get(0),
            )
            .optional()?;
        conn.execute(
            "INSERT OR REPLACE INTO purpose_assignments
               (purpose_key, workflow_id, webhook_url, workflow_name, assigned_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                assignment.purpose_key,
                assignment.workflow_id,
                assignment.webhook_url,
                assignment.workflow_name,
                assignment.assigned_at,
            ],
        )?;

        match previous {
            Some(old) if old != workflow_id => log::info!(
                "Purpose '{}' reassigned from workflow {} to {}",
                purpose_key,
                old,
                workflow_id
            ),
            _ => log::info!("Purpose '{}' assigned to workflow {}", purpose_key, workflow_id),
        }
        Ok(assignment)
    }

    /// Returns whether an assignment existed
    pub fn unassign_purpose(&self, purpose_key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM purpose_assignments WHERE purpose_key = ?1",
            params![purpose_key],
        )?;
        Ok(removed > 0)
    }

    pub fn get_purpose(&self, purpose_key: &str) -> Result<Option<PurposeAssignment>> {
        let conn = self.conn.lock();
        let assignment = conn
            .query_row(
                &format!("{} WHERE purpose_key = ?1", SELECT),
                params![purpose_key],
                PurposeAssignment::from_row,
            )
            .optional()?;
        Ok(assignment)
    }

    pub fn list_purposes(&self) -> Result<Vec<PurposeAssignment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{} ORDER BY purpose_key", SELECT))?;
        let rows = stmt.query_map([], PurposeAssignment::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
