//! Container runtime control
//!
//! A small client for the container runtime's control API, scoped to what the
//! node lifecycle needs:
//!
//! - **Lookup**: list containers (all states) and resolve a logical name
//! - **Exec**: create and start an exec session with stdout/stderr attached
//! - **Demultiplexing**: split the runtime's framed combined stream back into
//!   separate stdout and stderr buffers
//!
//! The [`ContainerRuntime`] trait is the seam between orchestration code and
//! the transport, so callers can be exercised against an in-memory runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use container_runtime::{ContainerLocator, DockerClient, ExecSpec};
//! use std::sync::Arc;
//!
//! let runtime = Arc::new(DockerClient::from_env());
//! let locator = ContainerLocator::new(runtime.clone(), "upora-n8n");
//!
//! if let Some(container) = locator.find().await? {
//!     let stream = runtime.exec(&container.id, &ExecSpec::shell("ls /")).await?;
//!     let output = container_runtime::collect_output(stream).await?;
//!     println!("{}", output.stdout);
//! }
//! ```

pub mod constants;
pub mod demux;
pub mod docker;
pub mod endpoint;
pub mod error;
pub mod exec;
pub mod locator;
pub mod runtime;

pub use demux::{DemuxedOutput, StreamDemuxer, StreamKind};
pub use docker::DockerClient;
pub use endpoint::DockerEndpoint;
pub use error::{Result, RuntimeError};
pub use exec::{collect_output, ExecOutput, ExecSpec, ExecStream};
pub use locator::{ContainerLocator, ContainerSummary};
pub use runtime::ContainerRuntime;
