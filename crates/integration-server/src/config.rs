//! Service configuration
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables. Every field has a default so an empty environment still starts.

use std::path::{Path, PathBuf};

use container_runtime::DockerEndpoint;
use node_lifecycle::constants::paths;
use node_lifecycle::NodeLifecycleConfig;
use serde::{Deserialize, Serialize};
use workflow_api::WorkflowApiSettings;

use crate::constants::{defaults, env};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Base URL the engine API is called on
    pub api_base_url: String,
    /// Public engine URL for webhook links; the API base when unset
    pub public_url: Option<String>,
    /// Environment-level API key; persisted settings are the fallback
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Where `api_key` came from
    #[serde(skip)]
    pub api_key_source: Option<ApiKeySource>,
    pub container_name: String,
    /// Directory holding template JSON files
    pub workflows_path: PathBuf,
    pub nodes_dir: String,
    pub database_path: String,
    /// Container runtime address in `DOCKER_HOST` syntax
    pub docker_host: Option<String>,
    /// Directory of the host's own ledger
    pub data_dir: PathBuf,
    pub listen_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: workflow_api::constants::defaults::BASE_URL.to_string(),
            public_url: None,
            api_key: None,
            api_key_source: None,
            container_name: paths::CONTAINER_NAME.to_string(),
            workflows_path: PathBuf::from(template_importer::constants::defaults::TEMPLATES_DIR),
            nodes_dir: paths::NODES_DIR.to_string(),
            database_path: paths::DATABASE_PATH.to_string(),
            docker_host: None,
            data_dir: PathBuf::from(defaults::DATA_DIR),
            listen_addr: defaults::LISTEN_ADDR.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load from `UPORA_CONFIG` (if set) and the process environment
    pub async fn from_env() -> Result<Self, ConfigError> {
        let file = std::env::var_os(env::CONFIG_FILE).map(PathBuf::from);
        let mut config = Self::load(file.as_deref()).await?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from disk; a missing file yields the defaults
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            log::warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)?;
        let mut config: Self = serde_json::from_str(&contents).map_err(ConfigError::Parse)?;
        if config.api_key.is_some() {
            config.api_key_source = Some(ApiKeySource::ConfigFile);
        }
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ui_url = var(env::UI_URL);
        if let Some(base) = var(env::API_BASE_URL).or_else(|| ui_url.clone()) {
            self.api_base_url = base;
        }
        if ui_url.is_some() {
            self.public_url = ui_url;
        }
        if let Some(key) = var(env::API_KEY) {
            self.api_key = Some(key);
            self.api_key_source = Some(ApiKeySource::Environment);
        }
        if let Some(name) = var(env::CONTAINER_NAME) {
            self.container_name = name;
        }
        if let Some(path) = var(env::WORKFLOWS_PATH) {
            self.workflows_path = PathBuf::from(path);
        }
        if let Some(dir) = var(env::NODES_DIR) {
            self.nodes_dir = dir;
        }
        if let Some(path) = var(env::DATABASE_PATH) {
            self.database_path = path;
        }
        if let Some(host) = var(env::DOCKER_HOST) {
            self.docker_host = Some(host);
        }
        if let Some(dir) = var(env::DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = var(env::LISTEN_ADDR) {
            self.listen_addr = addr;
        }
    }

    /// Base for production webhook URLs
    pub fn public_url(&self) -> &str {
        self.public_url.as_deref().unwrap_or(&self.api_base_url)
    }

    pub fn workflow_api_settings(&self) -> WorkflowApiSettings {
        WorkflowApiSettings::new(&self.api_base_url).with_public_url(self.public_url())
    }

    pub fn node_lifecycle(&self) -> NodeLifecycleConfig {
        NodeLifecycleConfig {
            container_name: self.container_name.clone(),
            nodes_dir: self.nodes_dir.clone(),
            database_path: self.database_path.clone(),
            ..NodeLifecycleConfig::default()
        }
    }

    pub fn docker_endpoint(&self) -> DockerEndpoint {
        match self.docker_host.as_deref() {
            Some(host) => DockerEndpoint::parse(host).unwrap_or_else(|| {
                log::warn!("Unsupported DOCKER_HOST '{}', using the default endpoint", host);
                DockerEndpoint::default()
            }),
            None => DockerEndpoint::default(),
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(defaults::LEDGER_FILE)
    }
}

/// Origin of a configured API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    ConfigFile,
    Environment,
}

impl ApiKeySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigFile => "configFile",
            Self::Environment => "environment",
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
}
