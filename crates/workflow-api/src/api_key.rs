//! API key resolution
//!
//! Precedence: environment variable, then persisted setting. A missing key is
//! reported as [`WorkflowApiError::ConfigurationMissing`] when a request is
//! made rather than being sent as an empty header.

use std::sync::Arc;

use crate::constants::keys;
use crate::error::{Result, WorkflowApiError};

/// Read access to persisted settings
pub trait SettingLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Resolves the API key for each request
#[derive(Clone, Default)]
pub struct ApiKeyResolver {
    env_value: Option<String>,
    settings: Option<Arc<dyn SettingLookup>>,
}

impl ApiKeyResolver {
    /// Resolver with an explicit environment-level key
    pub fn new(env_value: Option<String>) -> Self {
        Self {
            env_value,
            settings: None,
        }
    }

    /// Resolver reading `N8N_API_KEY` from the process environment
    pub fn from_env() -> Self {
        Self::new(std::env::var(keys::API_KEY_ENV).ok())
    }

    /// Fall back to a persisted setting when the environment has no key
    pub fn with_settings(mut self, settings: Arc<dyn SettingLookup>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn resolve(&self) -> Result<String> {
        let from_env = self
            .env_value
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);

        from_env
            .or_else(|| {
                self.settings
                    .as_ref()
                    .and_then(|s| s.lookup(keys::API_KEY_SETTING))
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
            })
            .ok_or(WorkflowApiError::ConfigurationMissing)
    }
}

impl std::fmt::Debug for ApiKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyResolver")
            .field("env_value", &self.env_value.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings.is_some())
            .finish()
    }
}
