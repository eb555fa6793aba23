//! Node Lifecycle
//!
//! Manages community node packages for a workflow engine running in a
//! container. Everything here drives the engine from the outside by executing
//! commands inside its container:
//!
//! - **Classification**: [`classify_install_output`] turns npm output into an
//!   outcome, independent of any container
//! - **Install**: [`NodeInstaller`] runs `npm install` with a hard timeout and
//!   falls back to a manual command when the runtime is unreachable
//! - **Resolution**: [`NodeTypeResolver`] recovers a package's registered node
//!   type from its installed files
//! - **Registration**: [`DbRegistrar`] writes the package into the engine's
//!   own database as a best-effort background step
//! - **Discovery**: [`PackageRegistryClient`] searches the package registry

pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod installer;
pub mod package;
pub mod registrar;
pub mod registry_search;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{classify_install_output, InstallClassification};
pub use config::NodeLifecycleConfig;
pub use error::{InstallError, RegistrationError};
pub use installer::{manual_install_command, InstallOutcome, NodeInstaller};
pub use package::{is_valid_package_name, validate_package_name};
pub use registrar::{DbRegistrar, RegistrationReport};
pub use registry_search::{NodePackageInfo, PackageRegistryClient};
pub use resolver::{pick_node_name, NodeTypeLookup, NodeTypeResolver};
