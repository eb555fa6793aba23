//! Workflow representation as returned by the engine

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::api::{WEBHOOK_NODE_SUFFIX, WEBHOOK_SEGMENT};
use crate::error::{Result, WorkflowApiError};

/// A workflow owned by the engine, plus the webhook details derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWorkflow {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub connections: Value,
    /// `path` parameters of the workflow's webhook nodes
    #[serde(default)]
    pub webhook_paths: Vec<String>,
    /// `{base}/webhook/{path}` for every webhook path
    #[serde(default)]
    pub production_webhook_urls: Vec<String>,
}

/// Older engine versions use numeric ids.
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

impl RemoteWorkflow {
    /// Parse an API response and derive its webhook URLs against `public_url`.
    pub fn from_api(value: Value, public_url: &str) -> Result<Self> {
        let mut workflow: Self = serde_json::from_value(value)
            .map_err(|e| WorkflowApiError::InvalidResponse(format!("workflow: {}", e)))?;
        workflow.derive_webhooks(public_url);
        Ok(workflow)
    }

    /// Recompute `webhook_paths` and `production_webhook_urls` from `nodes`.
    pub fn derive_webhooks(&mut self, public_url: &str) {
        self.webhook_paths = webhook_paths(&self.nodes);
        let base = public_url.trim_end_matches('/');
        self.production_webhook_urls = self
            .webhook_paths
            .iter()
            .map(|path| format!("{}/{}/{}", base, WEBHOOK_SEGMENT, path))
            .collect();
    }
}

/// Configured `path` of every webhook trigger node, without leading slashes
pub fn webhook_paths(nodes: &[Value]) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| {
            node.get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.ends_with(WEBHOOK_NODE_SUFFIX))
        })
        .filter_map(|node| {
            node.get("parameters")
                .and_then(|p| p.get("path"))
                .and_then(Value::as_str)
                .map(|p| p.trim_start_matches('/').to_string())
        })
        .filter(|path| !path.is_empty())
        .collect()
}
