//! Community node installation
//!
//! Installs a package into the engine container's nodes directory:
//!
//! 1. validate the package name (before touching the runtime)
//! 2. locate the container
//! 3. `mkdir -p` the nodes directory under a short timeout, ignoring
//!    failure
//! 4. `npm install <package>` in that directory, draining the multiplexed
//!    output under a hard wall-clock timeout
//! 5. classify the output; on success, start database registration in the
//!    background
//!
//! When the runtime cannot be reached at all (no socket mounted, daemon down)
//! the install is not attempted and the caller gets the shell command to run
//! by hand instead.
//!
//! A timed-out install is abandoned, not killed: npm may keep running inside
//! the container after the caller has been told it timed out.

use container_runtime::{collect_output, ContainerLocator, ExecOutput, ExecSpec, RuntimeError};
use serde::Serialize;

use crate::classifier::{classify_install_output, InstallClassification};
use crate::config::NodeLifecycleConfig;
use crate::error::InstallError;
use crate::package::validate_package_name;
use crate::registrar::DbRegistrar;

/// Reason reported alongside a manual command
const RUNTIME_UNAVAILABLE: &str = "Docker not available";

/// Result of an install attempt. Every caller has to handle all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum InstallOutcome {
    /// npm reported success
    #[serde(rename_all = "camelCase")]
    Installed {
        package_name: String,
        /// Nothing new was added; the package was already there
        already_installed: bool,
        output: String,
    },
    /// The runtime is unreachable; run this command on the host instead
    #[serde(rename_all = "camelCase")]
    ManualCommandRequired {
        package_name: String,
        manual_command: String,
        error: String,
    },
    /// npm ran and failed
    #[serde(rename_all = "camelCase")]
    Failed {
        package_name: String,
        error: String,
        stdout: String,
        stderr: String,
    },
}

impl InstallOutcome {
    pub fn package_name(&self) -> &str {
        match self {
            Self::Installed { package_name, .. }
            | Self::ManualCommandRequired { package_name, .. }
            | Self::Failed { package_name, .. } => package_name,
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Shell command that performs the install from the host
pub fn manual_install_command(container_name: &str, nodes_dir: &str, package_name: &str) -> String {
    format!(
        "docker exec {} sh -c \"mkdir -p {} && cd {} && npm install {}\"",
        container_name, nodes_dir, nodes_dir, package_name
    )
}

/// Installs community node packages into the engine container
#[derive(Clone)]
pub struct NodeInstaller {
    locator: ContainerLocator,
    config: NodeLifecycleConfig,
    registrar: Option<DbRegistrar>,
}

impl NodeInstaller {
    pub fn new(locator: ContainerLocator, config: NodeLifecycleConfig) -> Self {
        Self {
            locator,
            config,
            registrar: None,
        }
    }

    /// Register successful installs in the engine database
    pub fn with_registrar(mut self, registrar: DbRegistrar) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub async fn install(&self, package_name: &str) -> Result<InstallOutcome, InstallError> {
        validate_package_name(package_name)?;
        log::info!("Installing community node package '{}'", package_name);

        let container = match self.locator.find().await {
            Ok(Some(container)) => container,
            Ok(None) => {
                return Err(InstallError::ContainerNotFound(
                    self.locator.container_name().to_string(),
                ))
            }
            Err(e) if e.is_unreachable() => return Ok(self.manual_fallback(package_name, &e)),
            Err(e) => return Err(e.into()),
        };

        let runtime = self.locator.runtime();
        let nodes_dir = &self.config.nodes_dir;

        let mkdir = ExecSpec::new(["mkdir", "-p", nodes_dir.as_str()]);
        let prepared = tokio::time::timeout(self.config.prepare_timeout, async {
            let stream = runtime.exec(&container.id, &mkdir).await?;
            collect_output(stream).await
        })
        .await;
        match prepared {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.is_unreachable() => {
                return Ok(self.manual_fallback(package_name, &e))
            }
            Ok(Err(e)) => log::debug!("mkdir -p {} failed (ignored): {}", nodes_dir, e),
            Err(_) => log::warn!(
                "mkdir -p {} did not finish within {}s, continuing with install",
                nodes_dir,
                self.config.prepare_timeout.as_secs()
            ),
        }

        let install = ExecSpec::new(["npm", "install", package_name]).working_dir(nodes_dir.as_str());
        let timeout = self.config.install_timeout;
        let result = tokio::time::timeout(timeout, async {
            let stream = runtime.exec(&container.id, &install).await?;
            collect_output(stream).await
        })
        .await;

        let output: ExecOutput = match result {
            Err(_) => {
                log::warn!(
                    "npm install {} exceeded {}s; it may still be running in {}",
                    package_name,
                    timeout.as_secs(),
                    container.id
                );
                return Err(InstallError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
            Ok(Err(e)) if e.is_unreachable() => {
                return Ok(self.manual_fallback(package_name, &e))
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(output)) => output,
        };

        match classify_install_output(&output.stdout, &output.stderr) {
            InstallClassification::Failed { error } => {
                log::warn!("npm install {} failed: {}", package_name, error);
                Ok(InstallOutcome::Failed {
                    package_name: package_name.to_string(),
                    error,
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            InstallClassification::Succeeded { already_installed } => {
                log::info!(
                    "npm install {} succeeded (already installed: {})",
                    package_name,
                    already_installed
                );
                if let Some(registrar) = &self.registrar {
                    registrar.spawn_registration(container.id.clone(), package_name.to_string());
                }
                Ok(InstallOutcome::Installed {
                    package_name: package_name.to_string(),
                    already_installed,
                    output: output.combined(),
                })
            }
        }
    }

    fn manual_fallback(&self, package_name: &str, cause: &RuntimeError) -> InstallOutcome {
        let manual_command = manual_install_command(
            self.locator.container_name(),
            &self.config.nodes_dir,
            package_name,
        );
        log::warn!(
            "Container runtime unavailable ({}); install manually with: {}",
            cause,
            manual_command
        );
        InstallOutcome::ManualCommandRequired {
            package_name: package_name.to_string(),
            manual_command,
            error: RUNTIME_UNAVAILABLE.to_string(),
        }
    }
}
