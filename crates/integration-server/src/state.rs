//! Shared handler state and wiring

use std::sync::Arc;

use container_runtime::{ContainerLocator, ContainerRuntime, DockerClient};
use integration_ledger::IntegrationLedger;
use node_lifecycle::{
    DbRegistrar, NodeInstaller, NodeTypeResolver, PackageRegistryClient, RegistrationReport,
};
use template_importer::TemplateImporter;
use tokio::sync::mpsc;
use workflow_api::{ApiKeyResolver, WorkflowApi, WorkflowApiClient};

use crate::config::ServiceConfig;

/// Everything a handler may need, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub workflows: Arc<dyn WorkflowApi>,
    pub installer: NodeInstaller,
    pub resolver: NodeTypeResolver,
    pub importer: Arc<TemplateImporter>,
    pub registry: PackageRegistryClient,
    pub ledger: Arc<IntegrationLedger>,
}

impl AppState {
    /// Wire the production stack.
    ///
    /// Registration reports are stored in the ledger by a background task.
    pub fn build(config: ServiceConfig, ledger: Arc<IntegrationLedger>) -> Self {
        let runtime: Arc<dyn ContainerRuntime> =
            Arc::new(DockerClient::new(config.docker_endpoint()));
        let api_key = ApiKeyResolver::new(config.api_key.clone()).with_settings(ledger.clone());
        let workflows: Arc<dyn WorkflowApi> = Arc::new(WorkflowApiClient::new(
            config.workflow_api_settings(),
            api_key,
        ));

        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        tokio::spawn(store_registration_reports(reports_rx, ledger.clone()));

        Self::with_components(config, runtime, workflows, ledger, Some(reports_tx))
    }

    /// Wire handlers around explicit runtime and workflow API implementations
    pub fn with_components(
        config: ServiceConfig,
        runtime: Arc<dyn ContainerRuntime>,
        workflows: Arc<dyn WorkflowApi>,
        ledger: Arc<IntegrationLedger>,
        reports: Option<mpsc::UnboundedSender<RegistrationReport>>,
    ) -> Self {
        let lifecycle = config.node_lifecycle();
        let locator = ContainerLocator::new(runtime.clone(), lifecycle.container_name.clone());

        let mut registrar = DbRegistrar::new(runtime, lifecycle.clone());
        if let Some(reports) = reports {
            registrar = registrar.with_reports(reports);
        }
        let installer =
            NodeInstaller::new(locator.clone(), lifecycle.clone()).with_registrar(registrar);
        let resolver = NodeTypeResolver::new(locator, lifecycle);
        let importer = TemplateImporter::new(
            workflows.clone(),
            Arc::new(resolver.clone()),
            config.workflows_path.clone(),
        );

        Self {
            config: Arc::new(config),
            workflows,
            installer,
            resolver,
            importer: Arc::new(importer),
            registry: PackageRegistryClient::default(),
            ledger,
        }
    }
}

/// Record what background registration discovered
pub async fn store_registration_reports(
    mut reports: mpsc::UnboundedReceiver<RegistrationReport>,
    ledger: Arc<IntegrationLedger>,
) {
    while let Some(report) = reports.recv().await {
        if !report.ok {
            log::warn!(
                "Engine registration of {} failed: {}",
                report.package,
                report.error.as_deref().unwrap_or("unknown error")
            );
            continue;
        }
        if let Err(e) =
            ledger.record_registration(&report.package, report.version.as_deref(), &report.node_types)
        {
            log::error!("Could not store registration of {}: {}", report.package, e);
        }
    }
    log::debug!("Registration report channel closed");
}
