//! Error types for template import

use std::path::PathBuf;

use thiserror::Error;
use workflow_api::WorkflowApiError;

/// Result type alias using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The id is not in the catalog
    #[error("Unknown template '{id}'. Allowed templates: {}", .allowed.join(", "))]
    UnknownTemplate { id: String, allowed: Vec<String> },

    /// The catalog entry exists but no file matches it
    #[error("Template file for '{id}' not found in {dir}")]
    TemplateFileMissing { id: String, dir: PathBuf },

    /// The template is not a usable JSON object
    #[error("Invalid workflow JSON: {0}")]
    InvalidJson(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Submission to the engine failed
    #[error(transparent)]
    Api(#[from] WorkflowApiError),
}
