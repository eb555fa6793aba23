//! Community node routes

use axum::extract::{Query, State};
use axum::Json;
use integration_ledger::InstalledNodePackage;
use node_lifecycle::{InstallOutcome, NodePackageInfo};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    package_name: String,
}

/// Install a package. npm failure and the manual-command fallback are
/// outcomes in the body, not HTTP errors.
pub async fn install(
    State(state): State<AppState>,
    Json(request): Json<PackageRequest>,
) -> ApiResult<Json<InstallOutcome>> {
    let outcome = state.installer.install(&request.package_name).await?;

    if let InstallOutcome::Installed {
        package_name,
        already_installed,
        ..
    } = &outcome
    {
        state
            .ledger
            .record_install(package_name, None, None, !already_installed)?;
    }
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    package: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedType {
    package_name: String,
    node_type: Option<String>,
}

pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Json<ResolvedType>> {
    let node_type = state.resolver.resolve(&query.package).await?;
    Ok(Json(ResolvedType {
        package_name: query.package,
        node_type,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    size: Option<usize>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<NodePackageInfo>> {
    Json(state.registry.search(&query.q, query.size).await)
}

pub async fn installed(State(state): State<AppState>) -> ApiResult<Json<Vec<InstalledNodePackage>>> {
    Ok(Json(state.ledger.list_installed()?))
}

/// Operator confirms the engine was restarted
pub async fn restarted(
    State(state): State<AppState>,
    Json(request): Json<PackageRequest>,
) -> ApiResult<Json<InstalledNodePackage>> {
    state
        .ledger
        .acknowledge_restart(&request.package_name)?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("Package '{}' is not tracked", request.package_name))
        })
}
