//! Workflow template import
//!
//! Loads a workflow template (from the allow-listed catalog or pasted JSON),
//! makes it portable and submits it to the engine:
//!
//! - community node types are rewritten to the type the installed package
//!   actually registers
//! - credential bindings and webhook ids are removed from every node
//! - pasted exports additionally lose pinned data, static data and metadata

pub mod catalog;
pub mod cleaning;
pub mod constants;
pub mod error;
pub mod importer;

pub use catalog::{find_template, list_templates, WorkflowTemplate};
pub use cleaning::{community_package, community_packages, rewrite_package_types, strip_node_fields};
pub use error::{ImportError, Result};
pub use importer::TemplateImporter;
