//! HTTP routes
//!
//! JSON over HTTP for the platform UI. Paths mirror the operations of the
//! library crates one to one.

mod nodes;
mod purposes;
mod settings;
mod templates;
mod workflows;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        // Workflows
        .route(
            "/api/workflows",
            get(workflows::list).post(workflows::create),
        )
        .route("/api/workflows/import", post(templates::import_json))
        .route(
            "/api/workflows/:id",
            get(workflows::get).delete(workflows::delete),
        )
        .route("/api/workflows/:id/activate", post(workflows::activate))
        .route("/api/workflows/:id/deactivate", post(workflows::deactivate))
        // Templates
        .route("/api/templates", get(templates::list))
        .route("/api/templates/:id/import", post(templates::import))
        // Community nodes
        .route("/api/nodes/install", post(nodes::install))
        .route("/api/nodes/resolve", get(nodes::resolve))
        .route("/api/nodes/search", get(nodes::search))
        .route("/api/nodes/installed", get(nodes::installed))
        .route("/api/nodes/restarted", post(nodes::restarted))
        // Purposes
        .route("/api/purposes", get(purposes::list))
        .route(
            "/api/purposes/:key",
            get(purposes::get)
                .put(purposes::assign)
                .delete(purposes::unassign),
        )
        // Settings
        .route(
            "/api/settings/api-key",
            get(settings::api_key_status)
                .put(settings::set_api_key)
                .delete(settings::clear_api_key),
        )
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router over fake collaborators, served on a free port

    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use container_runtime::{DockerClient, DockerEndpoint};
    use integration_ledger::IntegrationLedger;
    use node_lifecycle::PackageRegistryClient;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use workflow_api::{RemoteWorkflow, WorkflowApi, WorkflowApiError};

    use crate::config::ServiceConfig;
    use crate::state::AppState;

    /// In-memory engine holding created workflows
    #[derive(Default)]
    pub struct FakeEngine {
        pub workflows: Mutex<Vec<Value>>,
        pub missing_key: bool,
    }

    impl FakeEngine {
        fn check_key(&self) -> workflow_api::Result<()> {
            if self.missing_key {
                return Err(WorkflowApiError::ConfigurationMissing);
            }
            Ok(())
        }

        async fn find(&self, id: &str) -> workflow_api::Result<Value> {
            self.workflows
                .lock()
                .await
                .iter()
                .find(|w| w["id"] == id)
                .cloned()
                .ok_or(WorkflowApiError::Upstream {
                    status: 404,
                    body: "Not Found".into(),
                })
        }

        async fn set_active(&self, id: &str, active: bool) -> workflow_api::Result<RemoteWorkflow> {
            self.check_key()?;
            let mut workflows = self.workflows.lock().await;
            let workflow = workflows
                .iter_mut()
                .find(|w| w["id"] == id)
                .ok_or(WorkflowApiError::Upstream {
                    status: 404,
                    body: "Not Found".into(),
                })?;
            workflow["active"] = json!(active);
            RemoteWorkflow::from_api(workflow.clone(), "https://hooks.example.com")
        }
    }

    #[async_trait]
    impl WorkflowApi for FakeEngine {
        async fn list_workflows(&self) -> workflow_api::Result<Vec<RemoteWorkflow>> {
            self.check_key()?;
            self.workflows
                .lock()
                .await
                .iter()
                .map(|w| RemoteWorkflow::from_api(w.clone(), "https://hooks.example.com"))
                .collect()
        }

        async fn get_workflow(&self, id: &str) -> workflow_api::Result<RemoteWorkflow> {
            self.check_key()?;
            RemoteWorkflow::from_api(self.find(id).await?, "https://hooks.example.com")
        }

        async fn create_workflow(&self, workflow: &Value) -> workflow_api::Result<RemoteWorkflow> {
            self.check_key()?;
            let mut workflows = self.workflows.lock().await;
            let mut created = workflow.clone();
            created["id"] = json!(format!("wf-{}", workflows.len() + 1));
            created["active"] = json!(false);
            workflows.push(created.clone());
            RemoteWorkflow::from_api(created, "https://hooks.example.com")
        }

        async fn delete_workflow(&self, id: &str) -> workflow_api::Result<()> {
            self.check_key()?;
            self.workflows.lock().await.retain(|w| w["id"] != id);
            Ok(())
        }

        async fn activate_workflow(&self, id: &str) -> workflow_api::Result<RemoteWorkflow> {
            self.set_active(id, true).await
        }

        async fn deactivate_workflow(&self, id: &str) -> workflow_api::Result<RemoteWorkflow> {
            self.set_active(id, false).await
        }
    }

    pub struct TestServer {
        pub base: String,
        pub engine: Arc<FakeEngine>,
        pub ledger: Arc<IntegrationLedger>,
        pub http: reqwest::Client,
    }

    impl TestServer {
        pub fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }
    }

    /// Serve the router with a fake engine and an unreachable container runtime
    pub async fn serve(templates_dir: &Path, engine: FakeEngine) -> TestServer {
        let config = ServiceConfig {
            workflows_path: templates_dir.to_path_buf(),
            ..ServiceConfig::default()
        };
        serve_with_config(config, engine).await
    }

    /// Like [`serve`], templates are read from `config.workflows_path`
    pub async fn serve_with_config(config: ServiceConfig, engine: FakeEngine) -> TestServer {
        let engine = Arc::new(engine);
        let ledger = Arc::new(IntegrationLedger::open_in_memory().unwrap());
        let runtime = Arc::new(DockerClient::new(DockerEndpoint::Unix(
            config.workflows_path.join("no-such-docker.sock"),
        )));
        let mut state =
            AppState::with_components(config, runtime, engine.clone(), ledger.clone(), None);
        state.registry = PackageRegistryClient::new("http://127.0.0.1:1");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = super::router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            engine,
            ledger,
            http: reqwest::Client::new(),
        }
    }
}
