//! Error types for node lifecycle operations

use container_runtime::RuntimeError;
use thiserror::Error;

/// Errors an install can fail with.
///
/// npm-level failures are not errors: they come back as
/// [`InstallOutcome::Failed`](crate::InstallOutcome::Failed), and an
/// unreachable runtime comes back as
/// [`InstallOutcome::ManualCommandRequired`](crate::InstallOutcome::ManualCommandRequired).
#[derive(Debug, Error)]
pub enum InstallError {
    /// Package name does not look like an npm package
    #[error("Invalid package name: '{0}'")]
    InvalidPackageName(String),

    /// The engine container does not exist
    #[error("Container '{0}' not found")]
    ContainerNotFound(String),

    /// npm did not finish in time; it may still be running in the container
    #[error("Install timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The runtime answered but refused the request
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Errors from the database registration step
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Exec into the container failed
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The registration script reported `"ok": false`
    #[error("Registration rejected: {0}")]
    Rejected(String),

    /// The script printed nothing we can read as a report
    #[error("Unreadable registration output: {0}")]
    InvalidOutput(String),

    /// The script did not finish in time
    #[error("Registration timed out after {secs}s")]
    Timeout { secs: u64 },
}
