//! Error types for workflow API calls

use thiserror::Error;

/// Result type alias using WorkflowApiError
pub type Result<T> = std::result::Result<T, WorkflowApiError>;

/// Errors that can occur while calling the workflow engine
#[derive(Debug, Error)]
pub enum WorkflowApiError {
    /// No API key could be resolved from the environment or settings
    #[error("Workflow engine API key is not configured (set N8N_API_KEY or save one in settings)")]
    ConfigurationMissing,

    /// The engine answered with a non-success status
    #[error("Workflow engine API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered 2xx with a body we cannot use
    #[error("Invalid response from workflow engine: {0}")]
    InvalidResponse(String),
}

impl WorkflowApiError {
    /// HTTP status of an upstream error
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
