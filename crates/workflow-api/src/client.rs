//! Workflow API client
//!
//! Every call resolves the API key first, so a missing key fails before any
//! network traffic. Non-2xx responses keep the body text for diagnostics.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::api_key::ApiKeyResolver;
use crate::constants::{api, defaults};
use crate::error::{Result, WorkflowApiError};
use crate::types::RemoteWorkflow;

/// Workflow operations used by importers and the host surface
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn list_workflows(&self) -> Result<Vec<RemoteWorkflow>>;
    async fn get_workflow(&self, id: &str) -> Result<RemoteWorkflow>;
    async fn create_workflow(&self, workflow: &Value) -> Result<RemoteWorkflow>;
    /// Idempotent: a workflow that is already gone counts as deleted.
    async fn delete_workflow(&self, id: &str) -> Result<()>;
    async fn activate_workflow(&self, id: &str) -> Result<RemoteWorkflow>;
    async fn deactivate_workflow(&self, id: &str) -> Result<RemoteWorkflow>;
}

/// Where the engine lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowApiSettings {
    /// Base URL API requests are sent to
    pub base_url: String,
    /// Base URL production webhooks are advertised under
    pub public_url: String,
}

impl Default for WorkflowApiSettings {
    fn default() -> Self {
        Self::new(defaults::BASE_URL)
    }
}

impl WorkflowApiSettings {
    /// Settings where webhooks are served from the API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            public_url: base_url.clone(),
            base_url,
        }
    }

    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Authenticated REST client for the engine's workflows resource
#[derive(Debug, Clone)]
pub struct WorkflowApiClient {
    http_client: reqwest::Client,
    settings: WorkflowApiSettings,
    api_key: ApiKeyResolver,
}

impl WorkflowApiClient {
    pub fn new(settings: WorkflowApiSettings, api_key: ApiKeyResolver) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            settings,
            api_key,
        }
    }

    pub fn settings(&self) -> &WorkflowApiSettings {
        &self.settings
    }

    /// Send an authenticated request to `path` (relative to the base URL).
    ///
    /// Returns `None` for `204 No Content` and for empty bodies.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        self.send(method, path, &[], body).await
    }

    /// `request` with query parameters, encoded by the HTTP client
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let api_key = self.api_key.resolve()?;
        let url = format!("{}{}", self.settings.base_url, path);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(api::API_KEY_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("{} {} failed with {}: {}", method, path, status, body);
            return Err(WorkflowApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| WorkflowApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))
    }

    /// Request that must return a workflow object
    async fn workflow_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RemoteWorkflow> {
        let value = self.request(method, path, body).await?.ok_or_else(|| {
            WorkflowApiError::InvalidResponse(format!("empty response from {}", path))
        })?;
        RemoteWorkflow::from_api(value, &self.settings.public_url)
    }

    fn workflow_path(id: &str) -> String {
        format!("{}/{}", api::WORKFLOWS_PATH, id)
    }
}

#[async_trait]
impl WorkflowApi for WorkflowApiClient {
    async fn list_workflows(&self) -> Result<Vec<RemoteWorkflow>> {
        let mut workflows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let query = match cursor.as_deref() {
                Some(c) => vec![("cursor", c)],
                None => Vec::new(),
            };

            let page = self
                .send(Method::GET, api::WORKFLOWS_PATH, &query, None)
                .await?
                .unwrap_or_default();
            let data = page
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            for item in data {
                workflows.push(RemoteWorkflow::from_api(item, &self.settings.public_url)?);
            }

            cursor = page
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(String::from);
            if cursor.is_none() {
                break;
            }
        }

        Ok(workflows)
    }

    async fn get_workflow(&self, id: &str) -> Result<RemoteWorkflow> {
        self.workflow_request(Method::GET, &Self::workflow_path(id), None)
            .await
    }

    async fn create_workflow(&self, workflow: &Value) -> Result<RemoteWorkflow> {
        let created = self
            .workflow_request(Method::POST, api::WORKFLOWS_PATH, Some(workflow))
            .await?;
        log::info!("Created workflow '{}' ({})", created.name, created.id);
        Ok(created)
    }

    async fn delete_workflow(&self, id: &str) -> Result<()> {
        match self
            .request(Method::DELETE, &Self::workflow_path(id), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(WorkflowApiError::Upstream { status: 404, .. }) => {
                log::info!("Workflow {} already absent, treating delete as done", id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn activate_workflow(&self, id: &str) -> Result<RemoteWorkflow> {
        let path = format!("{}/activate", Self::workflow_path(id));
        self.workflow_request(Method::POST, &path, None).await
    }

    async fn deactivate_workflow(&self, id: &str) -> Result<RemoteWorkflow> {
        let path = format!("{}/deactivate", Self::workflow_path(id));
        self.workflow_request(Method::POST, &path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> WorkflowApiClient {
        WorkflowApiClient::new(
            WorkflowApiSettings::new(base_url).with_public_url("https://hooks.example.com"),
            ApiKeyResolver::new(Some("test-key".into())),
        )
    }

    #[tokio::test]
    async fn test_delete_not_found_is_success() {
        let router = Router::new().route(
            "/api/v1/workflows/:id",
            delete(|| async { (AxumStatus::NOT_FOUND, "Not Found") }),
        );
        let base = serve(router).await;

        client(&base).delete_workflow("gone").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_server_error_propagates() {
        let router = Router::new().route(
            "/api/v1/workflows/:id",
            delete(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let err = client(&base).delete_workflow("x").await.unwrap_err();
        match err {
            WorkflowApiError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_sends_key_and_derives_webhooks() {
        let router = Router::new().route(
            "/api/v1/workflows",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if headers.get("x-n8n-api-key").and_then(|v| v.to_str().ok()) != Some("test-key")
                {
                    return (AxumStatus::UNAUTHORIZED, Json(json!({"message": "unauthorized"})));
                }
                let mut created = body;
                created["id"] = json!("new-id");
                created["active"] = json!(false);
                (AxumStatus::OK, Json(created))
            }),
        );
        let base = serve(router).await;

        let created = client(&base)
            .create_workflow(&json!({
                "name": "Chat",
                "nodes": [{"type": "n8n-nodes-base.webhook", "parameters": {"path": "chat"}}],
                "connections": {},
                "settings": {"executionOrder": "v1"}
            }))
            .await
            .unwrap();

        assert_eq!(created.id, "new-id");
        assert_eq!(
            created.production_webhook_urls,
            vec!["https://hooks.example.com/webhook/chat"]
        );
    }

    #[tokio::test]
    async fn test_list_follows_cursor() {
        let router = Router::new().route(
            "/api/v1/workflows",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                match q.get("cursor").map(String::as_str) {
                    None => Json(json!({"data": [{"id": "1"}], "nextCursor": "page2"})),
                    Some("page2") => Json(json!({"data": [{"id": "2"}], "nextCursor": null})),
                    Some(_) => Json(json!({"data": []})),
                }
            }),
        );
        let base = serve(router).await;

        let workflows = client(&base).list_workflows().await.unwrap();
        let ids: Vec<_> = workflows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_list_cursor_survives_url_encoding() {
        let router = Router::new().route(
            "/api/v1/workflows",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                match q.get("cursor").map(String::as_str) {
                    None => Json(json!({"data": [{"id": "1"}], "nextCursor": "eyJh+b/c=="})),
                    Some("eyJh+b/c==") => Json(json!({"data": [{"id": "2"}]})),
                    Some(other) => Json(json!({"data": [{"id": format!("mangled:{}", other)}]})),
                }
            }),
        );
        let base = serve(router).await;

        let workflows = client(&base).list_workflows().await.unwrap();
        let ids: Vec<_> = workflows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_activate_and_no_content() {
        let router = Router::new()
            .route(
                "/api/v1/workflows/:id/activate",
                post(|Path(id): Path<String>| async move {
                    Json(json!({"id": id, "name": "wf", "active": true}))
                }),
            )
            .route(
                "/api/v1/workflows/:id/deactivate",
                post(|| async { AxumStatus::NO_CONTENT }),
            );
        let base = serve(router).await;
        let api = client(&base);

        let activated = api.activate_workflow("7").await.unwrap();
        assert!(activated.active);
        assert_eq!(activated.id, "7");

        let raw = api
            .request(Method::POST, "/api/v1/workflows/7/deactivate", None)
            .await
            .unwrap();
        assert!(raw.is_none());
        assert!(matches!(
            api.deactivate_workflow("7").await,
            Err(WorkflowApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_sending() {
        let api = WorkflowApiClient::new(
            WorkflowApiSettings::new("http://127.0.0.1:9"),
            ApiKeyResolver::new(None),
        );
        assert!(matches!(
            api.list_workflows().await,
            Err(WorkflowApiError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_settings_trim_trailing_slash() {
        let settings = WorkflowApiSettings::new("http://localhost:5678/");
        assert_eq!(settings.base_url, "http://localhost:5678");
        assert_eq!(settings.public_url, "http://localhost:5678");
    }
}
