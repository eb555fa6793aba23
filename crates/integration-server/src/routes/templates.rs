//! Template catalog and import routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use template_importer::{list_templates, WorkflowTemplate};
use workflow_api::RemoteWorkflow;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list() -> Json<&'static [WorkflowTemplate]> {
    Json(list_templates())
}

pub async fn import(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<RemoteWorkflow>)> {
    let workflow = state.importer.import_template(&id).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// Body is the pasted workflow export, as text
pub async fn import_json(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<(StatusCode, Json<RemoteWorkflow>)> {
    let workflow = state.importer.import_from_json(&body).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{serve, FakeEngine};
    use serde_json::Value;

    #[tokio::test]
    async fn test_unknown_template_lists_allowed_ids() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve(dir.path(), FakeEngine::default()).await;

        let response = server
            .http
            .post(server.url("/api/templates/not-a-real-id/import"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("ai-tutor-chat"));
    }

    #[tokio::test]
    async fn test_template_import_strips_credentials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("email-notification.json"),
            r#"{"name": "Mail", "nodes": [
                {"name": "Send", "type": "n8n-nodes-10kcodeurs.mail", "credentials": {"smtp": {"id": "1"}}, "webhookId": "w"}
            ]}"#,
        )
        .unwrap();
        let server = serve(dir.path(), FakeEngine::default()).await;

        let response = server
            .http
            .post(server.url("/api/templates/email-notification/import"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let stored = server.engine.workflows.lock().await[0].clone();
        let node = &stored["nodes"][0];
        assert!(node.get("credentials").is_none());
        assert!(node.get("webhookId").is_none());
        // runtime unreachable: the type is left as written
        assert_eq!(node["type"], "n8n-nodes-10kcodeurs.mail");
    }

    #[tokio::test]
    async fn test_pasted_import_and_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve(dir.path(), FakeEngine::default()).await;

        let response = server
            .http
            .post(server.url("/api/workflows/import"))
            .body(r#"{"nodes": [], "meta": {"instanceId": "x"}}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        let created: Value = response.json().await.unwrap();
        assert_eq!(created["name"], "Imported workflow");

        let response = server
            .http
            .post(server.url("/api/workflows/import"))
            .body("[]")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_catalog_listing() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve(dir.path(), FakeEngine::default()).await;

        let templates: Vec<Value> = server
            .http
            .get(server.url("/api/templates"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(templates.iter().any(|t| t["namePattern"] == "tutor"));
    }
}
