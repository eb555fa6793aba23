//! Host constants
//!
//! Single source of truth for the host's environment variables and defaults.
//! Engine-side defaults (container name, nodes directory, timeouts) live in
//! the library crates that use them.

/// Environment variables read at startup
pub mod env {
    /// Path of an optional JSON config file
    pub const CONFIG_FILE: &str = "UPORA_CONFIG";
    pub const API_BASE_URL: &str = "N8N_API_BASE_URL";
    /// Public engine URL, used for production webhook URLs
    pub const UI_URL: &str = "N8N_UI_URL";
    pub const API_KEY: &str = "N8N_API_KEY";
    pub const CONTAINER_NAME: &str = "N8N_CONTAINER_NAME";
    pub const WORKFLOWS_PATH: &str = "N8N_WORKFLOWS_PATH";
    pub const NODES_DIR: &str = "N8N_NODES_DIR";
    pub const DATABASE_PATH: &str = "N8N_DATABASE_PATH";
    pub const DOCKER_HOST: &str = "DOCKER_HOST";
    pub const DATA_DIR: &str = "UPORA_DATA_DIR";
    pub const LISTEN_ADDR: &str = "UPORA_LISTEN_ADDR";
}

/// Default values for host configuration
pub mod defaults {
    /// Where the ledger database is kept
    pub const DATA_DIR: &str = "data";
    /// Ledger file name inside the data directory
    pub const LEDGER_FILE: &str = "integrations.sqlite";
    /// Address the HTTP surface binds to
    pub const LISTEN_ADDR: &str = "127.0.0.1:3100";
}
