//! Workflow API constants

/// Default values for API configuration
pub mod defaults {
    /// Engine base URL when nothing is configured
    pub const BASE_URL: &str = "http://localhost:5678";
}

/// Wire details of the engine's public API
pub mod api {
    /// Path prefix of the workflows resource
    pub const WORKFLOWS_PATH: &str = "/api/v1/workflows";
    /// Authentication header
    pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";
    /// Path segment under which production webhooks are served
    pub const WEBHOOK_SEGMENT: &str = "webhook";
    /// Type suffix shared by webhook trigger nodes
    pub const WEBHOOK_NODE_SUFFIX: &str = ".webhook";
}

/// Configuration keys
pub mod keys {
    /// Environment variable holding the API key
    pub const API_KEY_ENV: &str = "N8N_API_KEY";
    /// Persisted setting holding the API key
    pub const API_KEY_SETTING: &str = "n8n_api_key";
}
