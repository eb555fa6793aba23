//! Configuration for node lifecycle operations

use std::time::Duration;

use crate::constants::{paths, timeouts};

/// Where packages live in the engine container and how long steps may take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLifecycleConfig {
    /// Logical name (or ID prefix) of the engine container
    pub container_name: String,
    /// Directory `npm install` runs in
    pub nodes_dir: String,
    /// Engine database the registrar writes to
    pub database_path: String,
    /// Engine installation root inside the container
    pub engine_module_root: String,
    /// Limit for the best-effort `mkdir` before an install
    pub prepare_timeout: Duration,
    /// Wall-clock limit for an install
    pub install_timeout: Duration,
    /// Wall-clock limit for registration
    pub registration_timeout: Duration,
}

impl Default for NodeLifecycleConfig {
    fn default() -> Self {
        Self {
            container_name: paths::CONTAINER_NAME.to_string(),
            nodes_dir: paths::NODES_DIR.to_string(),
            database_path: paths::DATABASE_PATH.to_string(),
            engine_module_root: paths::ENGINE_MODULE_ROOT.to_string(),
            prepare_timeout: Duration::from_secs(timeouts::PREPARE_SECS),
            install_timeout: Duration::from_secs(timeouts::INSTALL_SECS),
            registration_timeout: Duration::from_secs(timeouts::REGISTRATION_SECS),
        }
    }
}

impl NodeLifecycleConfig {
    /// Directory a package is installed to
    pub fn package_dir(&self, package_name: &str) -> String {
        format!(
            "{}/node_modules/{}",
            self.nodes_dir.trim_end_matches('/'),
            package_name
        )
    }
}
