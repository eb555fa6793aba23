//! Allow-listed template catalog
//!
//! Only templates listed here can be imported by id. Each entry points at a
//! JSON file in the templates directory: `<id>.json`, or else the first
//! `*.json` file whose name contains the entry's name pattern.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ImportError, Result};

/// A template operators may import by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// Case-insensitive file name fragment used when `<id>.json` is absent
    pub name_pattern: &'static str,
}

const TEMPLATES: &[WorkflowTemplate] = &[
    WorkflowTemplate {
        id: "ai-tutor-chat",
        name: "AI tutor chat",
        description: "Answers learner questions in a lesson chat through a webhook",
        category: "ai",
        name_pattern: "tutor",
    },
    WorkflowTemplate {
        id: "lesson-feedback",
        name: "Lesson feedback summary",
        description: "Collects lesson feedback and summarises it for the course owner",
        category: "lessons",
        name_pattern: "feedback",
    },
    WorkflowTemplate {
        id: "email-notification",
        name: "Email notification",
        description: "Sends a templated email when a webhook is called",
        category: "messaging",
        name_pattern: "email",
    },
    WorkflowTemplate {
        id: "content-generation",
        name: "Content generation",
        description: "Drafts lesson content from a topic and learning objectives",
        category: "ai",
        name_pattern: "content",
    },
];

/// Every template that can be imported by id
pub fn list_templates() -> &'static [WorkflowTemplate] {
    TEMPLATES
}

/// Catalog entry for `id`, or an error naming the allowed ids
pub fn find_template(id: &str) -> Result<&'static WorkflowTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ImportError::UnknownTemplate {
            id: id.to_string(),
            allowed: TEMPLATES.iter().map(|t| t.id.to_string()).collect(),
        })
}

impl WorkflowTemplate {
    /// Find this template's file in `dir`.
    pub async fn locate(&self, dir: &Path) -> Result<PathBuf> {
        let exact = dir.join(format!("{}.json", self.id));
        if tokio::fs::try_exists(&exact).await.unwrap_or(false) {
            return Ok(exact);
        }

        let io_err = |source| ImportError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let pattern = self.name_pattern.to_lowercase();

        let mut candidates = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let file_name = entry.file_name().to_string_lossy().to_lowercase();
            if file_name.ends_with(".json") && file_name.contains(&pattern) {
                candidates.push(entry.path());
            }
        }

        // read_dir order is platform-dependent
        candidates.sort();
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| ImportError::TemplateFileMissing {
                id: self.id.to_string(),
                dir: dir.to_path_buf(),
            })
    }
}
