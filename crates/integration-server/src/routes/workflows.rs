//! Workflow proxy routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use workflow_api::RemoteWorkflow;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<RemoteWorkflow>>> {
    Ok(Json(state.workflows.list_workflows().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemoteWorkflow>> {
    Ok(Json(state.workflows.get_workflow(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(workflow): Json<Value>,
) -> ApiResult<(StatusCode, Json<RemoteWorkflow>)> {
    if !workflow.is_object() {
        return Err(ApiError::BadRequest(
            "workflow must be a JSON object".to_string(),
        ));
    }
    let created = state.workflows.create_workflow(&workflow).await?;
    log::info!("Created workflow {} '{}'", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.workflows.delete_workflow(&id).await?;
    log::info!("Deleted workflow {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemoteWorkflow>> {
    Ok(Json(state.workflows.activate_workflow(&id).await?))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemoteWorkflow>> {
    Ok(Json(state.workflows.deactivate_workflow(&id).await?))
}
