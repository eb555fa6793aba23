//! Workflow purpose routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use integration_ledger::PurposeAssignment;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    workflow_id: String,
    webhook_url: Option<String>,
    workflow_name: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PurposeAssignment>>> {
    Ok(Json(state.ledger.list_purposes()?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<PurposeAssignment>> {
    state
        .ledger
        .get_purpose(&key)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No workflow assigned to '{}'", key)))
}

/// Assign a workflow to a purpose. Missing name or webhook URL are taken from
/// the engine's copy of the workflow.
pub async fn assign(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<PurposeAssignment>> {
    let (webhook_url, workflow_name) = match (request.webhook_url, request.workflow_name) {
        (webhook_url, Some(name)) if webhook_url.is_some() => (webhook_url, name),
        (webhook_url, name) => {
            let workflow = state.workflows.get_workflow(&request.workflow_id).await?;
            (
                webhook_url.or_else(|| workflow.production_webhook_urls.first().cloned()),
                name.unwrap_or(workflow.name),
            )
        }
    };

    let assignment = state.ledger.assign_purpose(
        &key,
        &request.workflow_id,
        webhook_url.as_deref(),
        &workflow_name,
    )?;
    Ok(Json(assignment))
}

pub async fn unassign(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    if state.ledger.unassign_purpose(&key)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No workflow assigned to '{}'", key)))
    }
}
