//! Error types for container runtime operations

use thiserror::Error;

/// Result type alias using RuntimeError
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur while talking to the container runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime's control endpoint could not be reached at all
    #[error("Container runtime unreachable: {0}")]
    Unreachable(String),

    /// The runtime answered with a non-success status
    #[error("Container runtime API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The runtime sent data that does not follow its own protocol
    #[error("Container runtime protocol error: {0}")]
    Protocol(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RuntimeError {
    /// Whether this error means the runtime itself is unavailable
    /// (no socket, connection refused, handshake failure).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<hyper::Error> for RuntimeError {
    fn from(err: hyper::Error) -> Self {
        // A connection that dies before any response is indistinguishable from
        // a runtime that is not there.
        if err.is_closed() || err.is_incomplete_message() || err.is_canceled() {
            Self::Unreachable(err.to_string())
        } else {
            Self::Protocol(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_classification() {
        assert!(RuntimeError::Unreachable("no socket".into()).is_unreachable());
        assert!(!RuntimeError::Api {
            status: 404,
            message: "no such container".into()
        }
        .is_unreachable());
        assert!(!RuntimeError::protocol("bad frame").is_unreachable());
    }
}
