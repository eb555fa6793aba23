//! Settings routes
//!
//! The API key can be read back only as "configured or not"; its value is
//! never returned.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use workflow_api::constants::keys::API_KEY_SETTING;

use crate::config::ApiKeySource;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    configured: bool,
    /// `environment`, `configFile` or `settings`
    source: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    api_key: String,
}

pub async fn api_key_status(State(state): State<AppState>) -> ApiResult<Json<ApiKeyStatus>> {
    let source = if state.config.api_key.is_some() {
        Some(
            state
                .config
                .api_key_source
                .unwrap_or(ApiKeySource::Environment)
                .as_str(),
        )
    } else if state
        .ledger
        .get_setting(API_KEY_SETTING)?
        .is_some_and(|k| !k.trim().is_empty())
    {
        Some("settings")
    } else {
        None
    };

    Ok(Json(ApiKeyStatus {
        configured: source.is_some(),
        source,
    }))
}

pub async fn set_api_key(
    State(state): State<AppState>,
    Json(request): Json<ApiKeyRequest>,
) -> ApiResult<StatusCode> {
    let key = request.api_key.trim();
    if key.is_empty() {
        return Err(ApiError::BadRequest("API key must not be empty".to_string()));
    }
    state.ledger.set_setting(API_KEY_SETTING, key)?;
    log::info!("Workflow engine API key saved to settings");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_api_key(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.ledger.delete_setting(API_KEY_SETTING)?;
    log::info!("Workflow engine API key removed from settings");
    Ok(StatusCode::NO_CONTENT)
}
