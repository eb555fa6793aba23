//! Template importer

use std::path::PathBuf;
use std::sync::Arc;

use node_lifecycle::NodeTypeLookup;
use serde_json::{json, Map, Value};
use workflow_api::{RemoteWorkflow, WorkflowApi};

use crate::catalog::find_template;
use crate::cleaning::{community_packages, rewrite_package_types, strip_node_fields};
use crate::constants::{defaults, stripped};
use crate::error::{ImportError, Result};

/// Imports templates into the workflow engine
pub struct TemplateImporter {
    api: Arc<dyn WorkflowApi>,
    lookup: Arc<dyn NodeTypeLookup>,
    templates_dir: PathBuf,
}

impl TemplateImporter {
    pub fn new(
        api: Arc<dyn WorkflowApi>,
        lookup: Arc<dyn NodeTypeLookup>,
        templates_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api,
            lookup,
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &std::path::Path {
        &self.templates_dir
    }

    /// Import an allow-listed template by id.
    ///
    /// Community node types are rewritten to what the installed package
    /// registers before the workflow is created.
    pub async fn import_template(&self, template_id: &str) -> Result<RemoteWorkflow> {
        let template = find_template(template_id)?;
        let path = template.locate(&self.templates_dir).await?;
        log::info!("Importing template '{}' from {}", template.id, path.display());

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ImportError::Io {
                path: path.clone(),
                source,
            })?;
        let mut workflow = parse_object(&raw)?;

        let mut nodes = take_nodes(&mut workflow);
        self.rewrite_community_types(&mut nodes).await;
        strip_node_fields(&mut nodes, stripped::NODE_FIELDS);

        let payload = build_payload(workflow, nodes, template.name);
        Ok(self.api.create_workflow(&payload).await?)
    }

    /// Import an arbitrary pasted workflow export.
    pub async fn import_from_json(&self, raw: &str) -> Result<RemoteWorkflow> {
        let mut workflow = parse_object(raw)?;
        for field in stripped::WORKFLOW_FIELDS {
            workflow.remove(*field);
        }

        let mut nodes = take_nodes(&mut workflow);
        strip_node_fields(&mut nodes, stripped::NODE_FIELDS);

        let payload = build_payload(workflow, nodes, defaults::IMPORTED_NAME);
        log::info!("Importing pasted workflow '{}'", payload["name"]);
        Ok(self.api.create_workflow(&payload).await?)
    }

    async fn rewrite_community_types(&self, nodes: &mut [Value]) {
        for package in community_packages(nodes) {
            let Some(resolved) = self.lookup.resolve(&package).await else {
                log::info!("Keeping node types of {} (not resolvable)", package);
                continue;
            };
            let changed = rewrite_package_types(nodes, &package, &resolved);
            if changed > 0 {
                log::info!("Rewrote {} node(s) of {} to {}", changed, package, resolved);
            }
        }
    }
}

fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ImportError::InvalidJson(
            "workflow must be a JSON object".to_string(),
        )),
        Err(e) => Err(ImportError::InvalidJson(e.to_string())),
    }
}

fn take_nodes(workflow: &mut Map<String, Value>) -> Vec<Value> {
    match workflow.remove("nodes") {
        Some(Value::Array(nodes)) => nodes,
        _ => Vec::new(),
    }
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// Body accepted by the engine's create endpoint
fn build_payload(mut workflow: Map<String, Value>, nodes: Vec<Value>, default_name: &str) -> Value {
    let name = present(workflow.remove("name"))
        .and_then(|n| n.as_str().map(String::from))
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| default_name.to_string());
    let connections = present(workflow.remove("connections")).unwrap_or_else(|| json!({}));
    let settings = present(workflow.remove("settings"))
        .unwrap_or_else(|| json!({ "executionOrder": defaults::EXECUTION_ORDER }));

    json!({
        "name": name,
        "nodes": nodes,
        "connections": connections,
        "settings": settings,
    })
}
