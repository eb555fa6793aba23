//! Workflow engine REST API
//!
//! Authenticated wrapper over the engine's `/api/v1/workflows` resource. The
//! engine owns workflow lifecycle; this crate only reads and writes through
//! its public API and derives the webhook URLs callers need to trigger a
//! workflow.

pub mod api_key;
pub mod client;
pub mod constants;
pub mod error;
pub mod types;

pub use api_key::{ApiKeyResolver, SettingLookup};
pub use client::{WorkflowApi, WorkflowApiClient, WorkflowApiSettings};
pub use error::{Result, WorkflowApiError};
pub use types::RemoteWorkflow;
