//! Node cleaning and community type rewriting
//!
//! Functions here work on the raw `nodes` array so that fields this crate does
//! not know about pass through untouched.

use serde_json::Value;

use crate::constants::prefixes;

/// Package a community node type belongs to.
///
/// `n8n-nodes-foo.bar` and `@acme/n8n-nodes-foo.bar` are community types;
/// built-in (`n8n-nodes-base.*`) and engine-scoped (`@n8n/*`) types are not.
pub fn community_package(node_type: &str) -> Option<&str> {
    if node_type.starts_with(prefixes::BUILT_IN) || node_type.starts_with(prefixes::ENGINE_SCOPE) {
        return None;
    }

    let is_community = match node_type.strip_prefix('@') {
        Some(scoped) => scoped
            .split_once('/')
            .is_some_and(|(_, name)| name.starts_with(prefixes::COMMUNITY)),
        None => node_type.starts_with(prefixes::COMMUNITY),
    };
    if !is_community {
        return None;
    }

    node_type.split_once('.').map(|(package, _)| package)
}

/// Distinct community packages referenced by `nodes`, in first-seen order
pub fn community_packages(nodes: &[Value]) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for node_type in nodes.iter().filter_map(node_type) {
        if let Some(package) = community_package(node_type) {
            if !packages.iter().any(|p| p == package) {
                packages.push(package.to_string());
            }
        }
    }
    packages
}

fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

/// Set the type of every node from `package` to `resolved_type`.
///
/// Returns how many nodes changed.
pub fn rewrite_package_types(nodes: &mut [Value], package: &str, resolved_type: &str) -> usize {
    let mut rewritten = 0;
    for node in nodes.iter_mut() {
        let belongs = node_type(node)
            .and_then(community_package)
            .is_some_and(|p| p == package);
        if belongs && node_type(node) != Some(resolved_type) {
            node["type"] = Value::String(resolved_type.to_string());
            rewritten += 1;
        }
    }
    rewritten
}

/// Remove `fields` from every node object
pub fn strip_node_fields(nodes: &mut [Value], fields: &[&str]) {
    for node in nodes.iter_mut().filter_map(Value::as_object_mut) {
        for field in fields {
            node.remove(*field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_community_package_detection() {
        assert_eq!(
            community_package("n8n-nodes-10kcodeurs.sendMail"),
            Some("n8n-nodes-10kcodeurs")
        );
        assert_eq!(
            community_package("@acme/n8n-nodes-crm.contact"),
            Some("@acme/n8n-nodes-crm")
        );
        assert_eq!(community_package("n8n-nodes-base.webhook"), None);
        assert_eq!(community_package("@n8n/n8n-nodes-langchain.agent"), None);
        assert_eq!(community_package("@acme/other.node"), None);
        assert_eq!(community_package("n8n-nodes-nodot"), None);
    }

    #[test]
    fn test_packages_are_grouped() {
        let nodes = vec![
            json!({"type": "n8n-nodes-mail.send"}),
            json!({"type": "n8n-nodes-base.set"}),
            json!({"type": "n8n-nodes-mail.read"}),
            json!({"type": "n8n-nodes-pdf.render"}),
            json!({"name": "no type"}),
        ];
        assert_eq!(community_packages(&nodes), vec!["n8n-nodes-mail", "n8n-nodes-pdf"]);
    }

    #[test]
    fn test_rewrite_touches_only_that_package() {
        let mut nodes = vec![
            json!({"type": "n8n-nodes-mail.mail", "name": "A"}),
            json!({"type": "n8n-nodes-mail.mail", "name": "B"}),
            json!({"type": "n8n-nodes-pdf.render", "name": "C"}),
        ];
        let changed = rewrite_package_types(&mut nodes, "n8n-nodes-mail", "n8n-nodes-mail.sendMail");
        assert_eq!(changed, 2);
        assert_eq!(nodes[0]["type"], "n8n-nodes-mail.sendMail");
        assert_eq!(nodes[1]["name"], "B");
        assert_eq!(nodes[2]["type"], "n8n-nodes-pdf.render");
    }

    #[test]
    fn test_strip_fields() {
        let mut nodes = vec![
            json!({"type": "x", "webhookId": "abc", "credentials": {"smtp": {"id": "1"}}, "parameters": {}}),
            json!("not an object"),
        ];
        strip_node_fields(&mut nodes, &["webhookId", "credentials"]);
        assert_eq!(nodes[0], json!({"type": "x", "parameters": {}}));
    }
}
