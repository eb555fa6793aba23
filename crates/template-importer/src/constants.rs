//! Template import constants

/// Node type prefixes
pub mod prefixes {
    /// Community packages are named `n8n-nodes-*` (optionally scoped)
    pub const COMMUNITY: &str = "n8n-nodes-";
    /// Nodes bundled with the engine
    pub const BUILT_IN: &str = "n8n-nodes-base.";
    /// Scope of the engine's own packages
    pub const ENGINE_SCOPE: &str = "@n8n/";
}

/// Fields removed before submission
pub mod stripped {
    /// Removed from every node
    pub const NODE_FIELDS: &[&str] = &["webhookId", "credentials"];
    /// Removed from pasted workflows
    pub const WORKFLOW_FIELDS: &[&str] = &["pinData", "staticData", "meta"];
}

pub mod defaults {
    /// Directory template files are read from
    pub const TEMPLATES_DIR: &str = "/app/n8n-workflows";
    /// Name given to pasted workflows without one
    pub const IMPORTED_NAME: &str = "Imported workflow";
    /// Execution order used when a template carries no settings
    pub const EXECUTION_ORDER: &str = "v1";
}
