//! HTTP error mapping
//!
//! Every handler error becomes a status code and `{"error": message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use container_runtime::RuntimeError;
use integration_ledger::LedgerError;
use node_lifecycle::InstallError;
use template_importer::ImportError;
use workflow_api::WorkflowApiError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowApiError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Workflow(e) => workflow_status(e),
            Self::Install(InstallError::InvalidPackageName(_)) => StatusCode::BAD_REQUEST,
            Self::Install(InstallError::ContainerNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Install(InstallError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Install(InstallError::Runtime(_)) | Self::Runtime(_) => StatusCode::BAD_GATEWAY,
            Self::Import(ImportError::UnknownTemplate { .. } | ImportError::InvalidJson(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Import(ImportError::TemplateFileMissing { .. }) => StatusCode::NOT_FOUND,
            Self::Import(ImportError::Api(e)) => workflow_status(e),
            Self::Import(ImportError::Io { .. }) | Self::Ledger(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

fn workflow_status(error: &WorkflowApiError) -> StatusCode {
    match error {
        WorkflowApiError::ConfigurationMissing => StatusCode::SERVICE_UNAVAILABLE,
        WorkflowApiError::Upstream { status: 404, .. } => StatusCode::NOT_FOUND,
        WorkflowApiError::Upstream { .. }
        | WorkflowApiError::Http(_)
        | WorkflowApiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Request failed ({}): {}", status, self);
        } else {
            log::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
