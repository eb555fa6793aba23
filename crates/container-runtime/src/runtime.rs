//! Container runtime abstraction
//!
//! Orchestration code (installers, resolvers, registrars) only talks to this
//! trait. [`DockerClient`](crate::DockerClient) implements it over the real
//! control API; tests implement it in memory.

use async_trait::async_trait;

use crate::error::Result;
use crate::exec::{ExecSpec, ExecStream};
use crate::locator::ContainerSummary;

/// Operations the node lifecycle needs from a container runtime
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List containers. With `all` set, stopped containers are included.
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>>;

    /// Create and start an exec session in `container_id` with stdout and
    /// stderr attached, returning the raw multiplexed output stream.
    async fn exec(&self, container_id: &str, spec: &ExecSpec) -> Result<ExecStream>;
}
