//! Container lookup by logical name
//!
//! The engine container is configured by name (e.g. `upora-n8n`). The runtime
//! reports names with a leading `/`, so lookup strips it before comparing; an
//! ID prefix is accepted as well. Not finding the container is a normal
//! outcome and is returned as `None`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::protocol::NAME_SEPARATOR;
use crate::error::Result;
use crate::runtime::ContainerRuntime;

/// One entry of the runtime's container listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub image: String,
    /// Lifecycle state (`running`, `exited`, ...)
    #[serde(default)]
    pub state: String,
}

impl ContainerSummary {
    /// Names with the runtime's leading separator removed
    pub fn clean_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(|name| name.strip_prefix(NAME_SEPARATOR).unwrap_or(name))
    }

    /// Whether this container answers to `name_or_id`
    pub fn matches(&self, name_or_id: &str) -> bool {
        if name_or_id.is_empty() {
            return false;
        }
        self.clean_names().any(|name| name == name_or_id) || self.id.starts_with(name_or_id)
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// Resolves the configured container name to a live container
#[derive(Clone)]
pub struct ContainerLocator {
    runtime: Arc<dyn ContainerRuntime>,
    container_name: String,
}

impl ContainerLocator {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, container_name: impl Into<String>) -> Self {
        Self {
            runtime,
            container_name: container_name.into(),
        }
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn runtime(&self) -> &Arc<dyn ContainerRuntime> {
        &self.runtime
    }

    /// Find the configured container among all containers, running or not.
    pub async fn find(&self) -> Result<Option<ContainerSummary>> {
        let containers = self.runtime.list_containers(true).await?;
        let found = containers
            .into_iter()
            .find(|c| c.matches(&self.container_name));

        match &found {
            Some(container) => log::debug!(
                "Container '{}' resolved to {} ({})",
                self.container_name,
                container.id,
                container.state
            ),
            None => log::info!("Container '{}' not found", self.container_name),
        }
        Ok(found)
    }
}
