//! Runtime connection constants

/// Default endpoints for the container runtime control API
pub mod endpoints {
    /// Unix socket used by the runtime daemon
    pub const UNIX_SOCKET: &str = "/var/run/docker.sock";
    /// Named pipe used by the runtime daemon on Windows
    pub const NAMED_PIPE: &str = r"\\.\pipe\docker_engine";
    /// Environment variable that overrides the default endpoint
    pub const HOST_ENV: &str = "DOCKER_HOST";
}

/// Protocol details of the control API
pub mod protocol {
    /// API version prefix for every request path
    pub const API_VERSION: &str = "v1.41";
    /// Placeholder `Host` header for socket and pipe transports
    pub const LOCAL_HOST_HEADER: &str = "docker";
    /// Size of a multiplexed stream frame header (selector + padding + length)
    pub const FRAME_HEADER_LEN: usize = 8;
    /// Character the runtime prepends to container names
    pub const NAME_SEPARATOR: char = '/';
}
