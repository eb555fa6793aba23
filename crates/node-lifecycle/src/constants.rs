//! Node lifecycle constants
//!
//! Single source of truth for paths, timeouts and the text markers the
//! install heuristics depend on.

/// Default locations inside the engine container
pub mod paths {
    /// Container the engine runs in
    pub const CONTAINER_NAME: &str = "upora-n8n";
    /// Directory community packages are installed into
    pub const NODES_DIR: &str = "/home/node/.n8n/nodes";
    /// Engine's embedded SQLite database
    pub const DATABASE_PATH: &str = "/home/node/.n8n/database.sqlite";
    /// Engine installation, used to load its bundled SQLite driver
    pub const ENGINE_MODULE_ROOT: &str = "/usr/local/lib/node_modules/n8n";
}

/// Timeout configuration (in seconds)
pub mod timeouts {
    /// Limit for preparing the nodes directory
    pub const PREPARE_SECS: u64 = 15;
    /// Hard wall-clock limit for `npm install`
    pub const INSTALL_SECS: u64 = 120;
    /// Limit for the database registration script
    pub const REGISTRATION_SECS: u64 = 60;
}

/// npm output markers
pub mod markers {
    /// Any of these in the output means the install failed
    pub const FAILURE: &[&str] = &["npm ERR", "404 Not Found", "E404"];
    /// Case-insensitive patterns meaning nothing new was installed
    pub const ALREADY_INSTALLED: &[&str] =
        &[r"(?i)added 0 packages", r"(?i)up to date", r"(?i)already up to date"];
    /// Start of the error block npm prints on failure
    pub const ERROR_BLOCK: &str = r"(?i)npm error[^\n]*(\n[^\n]*)*";
}

/// Node type identifiers
pub mod node_types {
    /// Names the type grep picks up that are never the node's own name
    pub const PLACEHOLDER_NAMES: &[&str] = &["string", "options"];
    /// Node name inside a compiled node's `description` object. Shared with
    /// the registration script, so it must parse as both a Rust and a
    /// JavaScript regex.
    pub const DESCRIPTION_NAME: &str = r#"description\s*[:=]\s*\{[\s\S]*?name:\s*['"]([^'"]+)['"]"#;
}

/// Package registry search
pub mod registry {
    /// Registry base URL
    pub const BASE_URL: &str = "https://registry.npmjs.org";
    /// Keyword every community node package declares
    pub const COMMUNITY_KEYWORD: &str = "keywords:n8n-community-node-package";
    /// Default number of search results
    pub const DEFAULT_SIZE: usize = 20;
    /// Request timeout for searches
    pub const TIMEOUT_SECS: u64 = 10;
}
