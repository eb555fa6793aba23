//! Node type resolution
//!
//! A package's registered node type (`<package>.<name>`) cannot be derived
//! from its npm name. The resolver finds the first `*.node.js` file of the
//! installed package inside the container and greps it for `name:` literals.

use std::sync::LazyLock;

use async_trait::async_trait;
use container_runtime::{collect_output, ContainerLocator, ExecSpec, RuntimeError};
use regex::Regex;

use crate::config::NodeLifecycleConfig;
use crate::constants::node_types::PLACEHOLDER_NAMES;
use crate::package::is_valid_package_name;

static NAME_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name:\s*['"]([^'"]+)['"]"#).expect("name literal pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("identifier pattern is valid"));

/// Something that can map a package to its registered node type
#[async_trait]
pub trait NodeTypeLookup: Send + Sync {
    /// Registered type for `package_name`, if one can be found
    async fn resolve(&self, package_name: &str) -> Option<String>;
}

/// Recovers node types from files installed in the engine container
#[derive(Clone)]
pub struct NodeTypeResolver {
    locator: ContainerLocator,
    config: NodeLifecycleConfig,
}

impl NodeTypeResolver {
    pub fn new(locator: ContainerLocator, config: NodeLifecycleConfig) -> Self {
        Self { locator, config }
    }

    /// Resolve the node type of an installed package.
    ///
    /// `Ok(None)` covers an invalid name, a missing container, a package with
    /// no node file and a node file with no usable `name:`.
    pub async fn resolve(&self, package_name: &str) -> Result<Option<String>, RuntimeError> {
        if !is_valid_package_name(package_name) {
            log::debug!("Not resolving invalid package name '{}'", package_name);
            return Ok(None);
        }

        let Some(container) = self.locator.find().await? else {
            log::debug!(
                "Container '{}' not found, cannot resolve {}",
                self.locator.container_name(),
                package_name
            );
            return Ok(None);
        };
        let runtime = self.locator.runtime();

        let find = ExecSpec::shell(format!(
            "find '{}' -name \"*.node.js\" | head -1",
            self.config.package_dir(package_name)
        ));
        let found = collect_output(runtime.exec(&container.id, &find).await?).await?;
        let Some(node_file) = found.stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
            log::debug!("No *.node.js file installed for {}", package_name);
            return Ok(None);
        };

        let grep = ExecSpec::shell(format!(
            "grep -oE \"name: *['\\\"][^'\\\"]+['\\\"]\" '{}' | head -5",
            node_file.replace('\'', "")
        ));
        let matches = collect_output(runtime.exec(&container.id, &grep).await?).await?;

        let resolved = pick_node_name(package_name, &matches.stdout);
        match &resolved {
            Some(node_type) => log::info!("Resolved {} to node type {}", package_name, node_type),
            None => log::debug!("No node name found in {}", node_file),
        }
        Ok(resolved)
    }
}

#[async_trait]
impl NodeTypeLookup for NodeTypeResolver {
    async fn resolve(&self, package_name: &str) -> Option<String> {
        match NodeTypeResolver::resolve(self, package_name).await {
            Ok(node_type) => node_type,
            Err(e) => {
                log::warn!("Could not resolve node type of {}: {}", package_name, e);
                None
            }
        }
    }
}

/// Choose the node name from `name: '...'` grep output.
///
/// Placeholders are skipped; a camelCase identifier is preferred over any
/// other remaining match.
pub fn pick_node_name(package_name: &str, grep_output: &str) -> Option<String> {
    let candidates: Vec<&str> = NAME_LITERAL
        .captures_iter(grep_output)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|name| !PLACEHOLDER_NAMES.contains(name))
        .collect();

    let chosen = candidates
        .iter()
        .find(|name| IDENTIFIER.is_match(name))
        .or_else(|| candidates.first())?;

    Some(format!("{}.{}", package_name, chosen))
}
