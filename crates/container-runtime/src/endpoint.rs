//! Runtime endpoint selection and connection
//!
//! The control API is reachable over a unix socket, a Windows named pipe or
//! plain TCP. `DOCKER_HOST` picks one explicitly; otherwise the platform
//! default is used.

use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::constants::endpoints;
use crate::error::{Result, RuntimeError};

/// Byte stream to the runtime daemon
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Where the runtime's control API lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    /// Unix domain socket path
    Unix(PathBuf),
    /// Windows named pipe path
    NamedPipe(String),
    /// `host:port` of a TCP listener
    Tcp(String),
}

impl Default for DockerEndpoint {
    fn default() -> Self {
        if cfg!(windows) {
            Self::NamedPipe(endpoints::NAMED_PIPE.to_string())
        } else {
            Self::Unix(PathBuf::from(endpoints::UNIX_SOCKET))
        }
    }
}

impl DockerEndpoint {
    /// Endpoint from `DOCKER_HOST`, or the platform default
    pub fn from_env() -> Self {
        match std::env::var(endpoints::HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => Self::parse(host.trim()).unwrap_or_else(|| {
                log::warn!(
                    "Unsupported {} value '{}', using default endpoint",
                    endpoints::HOST_ENV,
                    host
                );
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Parse a `DOCKER_HOST`-style URL
    pub fn parse(host: &str) -> Option<Self> {
        if let Some(path) = host.strip_prefix("unix://") {
            Some(Self::Unix(PathBuf::from(path)))
        } else if let Some(path) = host.strip_prefix("npipe://") {
            // npipe:////./pipe/docker_engine
            Some(Self::NamedPipe(path.replace('/', "\\")))
        } else if let Some(addr) = host.strip_prefix("tcp://") {
            let addr = addr.trim_end_matches('/');
            (!addr.is_empty()).then(|| Self::Tcp(addr.to_string()))
        } else {
            None
        }
    }

    /// Value for the HTTP `Host` header
    pub fn host_header(&self) -> String {
        match self {
            Self::Tcp(addr) => addr.clone(),
            _ => crate::constants::protocol::LOCAL_HOST_HEADER.to_string(),
        }
    }

    /// Open a fresh connection. Any failure here means the runtime is
    /// unreachable.
    pub async fn connect(&self) -> Result<Box<dyn Connection>> {
        match self {
            #[cfg(unix)]
            Self::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path).await.map_err(|e| {
                    RuntimeError::Unreachable(format!("{}: {}", path.display(), e))
                })?;
                Ok(Box::new(stream))
            }
            #[cfg(not(unix))]
            Self::Unix(path) => Err(RuntimeError::Unreachable(format!(
                "Unix sockets are not supported on this platform: {}",
                path.display()
            ))),
            #[cfg(windows)]
            Self::NamedPipe(path) => {
                let pipe = tokio::net::windows::named_pipe::ClientOptions::new()
                    .open(path)
                    .map_err(|e| RuntimeError::Unreachable(format!("{}: {}", path, e)))?;
                Ok(Box::new(pipe))
            }
            #[cfg(not(windows))]
            Self::NamedPipe(path) => Err(RuntimeError::Unreachable(format!(
                "Named pipes are not supported on this platform: {}",
                path
            ))),
            Self::Tcp(addr) => {
                let stream = tokio::net::TcpStream::connect(addr)
                    .await
                    .map_err(|e| RuntimeError::Unreachable(format!("{}: {}", addr, e)))?;
                Ok(Box::new(stream))
            }
        }
    }
}

impl std::fmt::Display for DockerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::NamedPipe(path) => write!(f, "npipe://{}", path),
            Self::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_docker_host() {
        assert_eq!(
            DockerEndpoint::parse("unix:///run/user/1000/docker.sock"),
            Some(DockerEndpoint::Unix(PathBuf::from("/run/user/1000/docker.sock")))
        );
        assert_eq!(
            DockerEndpoint::parse("tcp://10.0.0.5:2375/"),
            Some(DockerEndpoint::Tcp("10.0.0.5:2375".to_string()))
        );
        assert_eq!(
            DockerEndpoint::parse("npipe:////./pipe/docker_engine"),
            Some(DockerEndpoint::NamedPipe(r"\\.\pipe\docker_engine".to_string()))
        );
        assert_eq!(DockerEndpoint::parse("ssh://user@host"), None);
        assert_eq!(DockerEndpoint::parse("tcp://"), None);
    }

    #[test]
    fn test_host_header() {
        assert_eq!(DockerEndpoint::Tcp("h:2375".into()).host_header(), "h:2375");
        assert_eq!(DockerEndpoint::default().host_header(), "docker");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_socket_is_unreachable() {
        let endpoint = DockerEndpoint::Unix(PathBuf::from("/nonexistent/upora/docker.sock"));
        let err = endpoint.connect().await.err().unwrap();
        assert!(err.is_unreachable());
    }
}
