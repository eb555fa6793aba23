//! Engine database registration
//!
//! After `npm install`, the engine does not know about the package until it is
//! recorded in its `installed_packages` / `installed_nodes` tables. The
//! registrar runs a script with the container's own Node.js runtime that reads
//! the package manifest, repairs a known credential layout mismatch, discovers
//! node names and upserts those rows directly into the engine's SQLite file.
//!
//! The engine may be running while this happens and nothing coordinates the
//! two writers. Registration is an enrichment step: its failure is logged and
//! reported on the optional report channel, never turned into an install
//! failure, and nothing is rolled back.

use std::sync::Arc;

use container_runtime::{collect_output, ContainerRuntime, ExecOutput, ExecSpec};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::NodeLifecycleConfig;
use crate::constants::node_types;
use crate::error::RegistrationError;

/// Script executed inside the container with `node -e`
const REGISTER_SCRIPT: &str = include_str!("scripts/register_package.js");

/// Result of one registration attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReport {
    pub ok: bool,
    pub package: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub node_types: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RegistrationReport {
    fn failed(package: &str, error: String) -> Self {
        Self {
            ok: false,
            package: package.to_string(),
            version: None,
            node_types: Vec::new(),
            error: Some(error),
        }
    }
}

/// Registers installed packages in the engine's database
#[derive(Clone)]
pub struct DbRegistrar {
    runtime: Arc<dyn ContainerRuntime>,
    config: NodeLifecycleConfig,
    reports: Option<mpsc::UnboundedSender<RegistrationReport>>,
}

impl DbRegistrar {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: NodeLifecycleConfig) -> Self {
        Self {
            runtime,
            config,
            reports: None,
        }
    }

    /// Publish every background registration result on `reports`
    pub fn with_reports(mut self, reports: mpsc::UnboundedSender<RegistrationReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    fn exec_spec(&self, package_name: &str) -> ExecSpec {
        ExecSpec::new(["node", "-e", REGISTER_SCRIPT])
            .env("PACKAGE_NAME", package_name)
            .env("NODES_DIR", &self.config.nodes_dir)
            .env("DB_PATH", &self.config.database_path)
            .env("ENGINE_MODULE_ROOT", &self.config.engine_module_root)
            .env("NODE_NAME_PATTERN", node_types::DESCRIPTION_NAME)
    }

    /// Run the registration script in `container_id` and wait for its report.
    pub async fn register(
        &self,
        container_id: &str,
        package_name: &str,
    ) -> Result<RegistrationReport, RegistrationError> {
        let spec = self.exec_spec(package_name);
        let timeout = self.config.registration_timeout;

        let output = tokio::time::timeout(timeout, async {
            let stream = self.runtime.exec(container_id, &spec).await?;
            collect_output(stream).await
        })
        .await
        .map_err(|_| RegistrationError::Timeout {
            secs: timeout.as_secs(),
        })??;

        parse_registration_output(&output)
    }

    /// Run [`register`](Self::register) on a detached task.
    ///
    /// The returned handle is only useful to tests; callers normally drop it.
    pub fn spawn_registration(&self, container_id: String, package_name: String) -> JoinHandle<()> {
        let registrar = self.clone();
        tokio::spawn(async move {
            let report = match registrar.register(&container_id, &package_name).await {
                Ok(report) => {
                    log::info!(
                        "Registered {} {} with node types {:?}",
                        report.package,
                        report.version.as_deref().unwrap_or("?"),
                        report.node_types
                    );
                    report
                }
                Err(e) => {
                    log::warn!("Registration of {} failed: {}", package_name, e);
                    RegistrationReport::failed(&package_name, e.to_string())
                }
            };

            if let Some(reports) = &registrar.reports {
                if reports.send(report).is_err() {
                    log::debug!("Registration report receiver dropped");
                }
            }
        })
    }
}

/// Read the script's report from its output.
///
/// A `"ok":false` report on stderr is a rejection; otherwise the last stdout
/// line that parses as a report wins.
pub(crate) fn parse_registration_output(
    output: &ExecOutput,
) -> Result<RegistrationReport, RegistrationError> {
    if output.stderr.contains("\"ok\":false") {
        let error = output
            .stderr
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line.trim()).ok())
            .find_map(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| output.stderr.trim().to_string());
        return Err(RegistrationError::Rejected(error));
    }

    output
        .stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<RegistrationReport>(line.trim()).ok())
        .ok_or_else(|| {
            let shown = if output.stdout.trim().is_empty() {
                output.stderr.trim()
            } else {
                output.stdout.trim()
            };
            RegistrationError::InvalidOutput(shown.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedRuntime};

    fn output(stdout: &str, stderr: &str) -> ExecOutput {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_parse_success_report() {
        let report = parse_registration_output(&output(
            "npm notice\n{\"ok\":true,\"package\":\"n8n-nodes-mail\",\"version\":\"1.2.0\",\"nodeTypes\":[\"n8n-nodes-mail.sendMail\"]}\n",
            "",
        ))
        .unwrap();
        assert!(report.ok);
        assert_eq!(report.version.as_deref(), Some("1.2.0"));
        assert_eq!(report.node_types, vec!["n8n-nodes-mail.sendMail"]);
    }

    #[test]
    fn test_parse_rejection() {
        let err = parse_registration_output(&output(
            "",
            "{\"ok\":false,\"error\":\"SQLITE_BUSY: database is locked\"}\n",
        ))
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Rejected(msg) if msg.contains("SQLITE_BUSY")));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_registration_output(&output("", "sh: node: not found")).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidOutput(msg) if msg.contains("node: not found")));
    }

    #[test]
    fn test_script_receives_parameters_via_env() {
        let registrar = DbRegistrar::new(
            Arc::new(ScriptedRuntime::empty()),
            NodeLifecycleConfig::default(),
        );
        let spec = registrar.exec_spec("@acme/n8n-nodes-crm");
        assert_eq!(spec.cmd[0], "node");
        assert_eq!(spec.cmd[1], "-e");
        assert!(spec.cmd[2].contains("installed_packages"));
        assert!(spec.cmd[2].contains("installed_nodes"));
        assert!(!spec.cmd[2].contains("@acme"));
        assert!(spec.env.contains(&"PACKAGE_NAME=@acme/n8n-nodes-crm".to_string()));
        assert!(spec
            .env
            .contains(&"DB_PATH=/home/node/.n8n/database.sqlite".to_string()));
    }

    fn description_name(source: &str) -> Option<String> {
        let pattern = regex::Regex::new(node_types::DESCRIPTION_NAME).unwrap();
        pattern.captures(source).map(|c| c[1].to_string())
    }

    #[test]
    fn test_description_name_pattern() {
        let compiled = r#"
class SendMail10Kcodeurs {
    constructor() {
        this.description = {
            displayName: 'Send Mail (10K)',
            name: 'sendMail10Kcodeurs',
            group: ['output'],
            properties: [
                { displayName: 'To', name: 'to', type: 'string', default: '' },
            ],
        };
    }
}
exports.SendMail10Kcodeurs = SendMail10Kcodeurs;
"#;
        assert_eq!(description_name(compiled).as_deref(), Some("sendMail10Kcodeurs"));

        let field_style = "class Pdf { description = {\n displayName: \"PDF\",\n name: \"renderPdf\" } }";
        assert_eq!(description_name(field_style).as_deref(), Some("renderPdf"));

        let credentials_only = "this.credentials = { name: 'smtpApi' };";
        assert_eq!(description_name(credentials_only), None);
    }

    #[test]
    fn test_script_receives_name_pattern() {
        let registrar = DbRegistrar::new(
            Arc::new(ScriptedRuntime::empty()),
            NodeLifecycleConfig::default(),
        );
        let spec = registrar.exec_spec("n8n-nodes-mail");
        let expected = format!("NODE_NAME_PATTERN={}", node_types::DESCRIPTION_NAME);
        assert!(spec.env.contains(&expected));
        assert!(spec.cmd[2].contains("process.env.NODE_NAME_PATTERN"));
    }

    #[tokio::test]
    async fn test_background_registration_reports_on_channel() {
        let runtime = Arc::new(ScriptedRuntime::with_container("upora-n8n").respond(
            "node -e",
            Scripted::stdout(
                "{\"ok\":true,\"package\":\"n8n-nodes-mail\",\"version\":\"1.0.0\",\"nodeTypes\":[\"n8n-nodes-mail.mail\"]}",
            ),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let registrar =
            DbRegistrar::new(runtime, NodeLifecycleConfig::default()).with_reports(tx);

        registrar
            .spawn_registration("upora-n8n-id".into(), "n8n-nodes-mail".into())
            .await
            .unwrap();

        let report = rx.recv().await.unwrap();
        assert!(report.ok);
        assert_eq!(report.node_types, vec!["n8n-nodes-mail.mail"]);
    }

    #[tokio::test]
    async fn test_background_failure_is_reported_not_raised() {
        let runtime = Arc::new(ScriptedRuntime::with_container("upora-n8n").respond(
            "node -e",
            Scripted::stderr("{\"ok\":false,\"error\":\"no such table: installed_packages\"}"),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let registrar =
            DbRegistrar::new(runtime, NodeLifecycleConfig::default()).with_reports(tx);

        registrar
            .spawn_registration("id".into(), "n8n-nodes-mail".into())
            .await
            .unwrap();

        let report = rx.recv().await.unwrap();
        assert!(!report.ok);
        assert!(report.error.unwrap().contains("no such table"));
    }
}
