//! Integration server
//!
//! Hosts the workflow engine integration for the platform UI: workflow proxy,
//! template import, community node install/resolve/registration and the
//! host-side ledger, all behind one JSON HTTP surface.

mod config;
mod constants;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use integration_ledger::IntegrationLedger;

use config::ServiceConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Integration server starting...");

    if let Err(e) = run().await {
        log::error!("Integration server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env().await?;
    log::info!(
        "Workflow engine at {} (container '{}', runtime {})",
        config.api_base_url,
        config.container_name,
        config.docker_endpoint()
    );
    match config.api_key_source {
        Some(source) => log::info!("Using the API key from {}", source.as_str()),
        None => log::info!("No API key configured; falling back to saved settings"),
    }

    let ledger = Arc::new(IntegrationLedger::open(config.ledger_path())?);
    let listen_addr = config.listen_addr.clone();
    let app = routes::router(AppState::build(config, ledger));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
