//! Community package discovery
//!
//! Searches the npm registry for packages carrying the community node keyword.
//! Search is advisory: any failure (network, status, body) degrades to a small
//! built-in list filtered by the query.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::registry;

/// A package offered to the operator for installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePackageInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub npm_url: Option<String>,
}

impl NodePackageInfo {
    fn builtin(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            description: Some(description.to_string()),
            npm_url: Some(format!("https://www.npmjs.com/package/{}", name)),
        }
    }
}

/// Offered when the registry cannot be searched
fn builtin_packages() -> Vec<NodePackageInfo> {
    vec![
        NodePackageInfo::builtin("n8n-nodes-10kcodeurs", "Send mail through 10K Codeurs"),
        NodePackageInfo::builtin("n8n-nodes-browserless", "Headless browser automation"),
        NodePackageInfo::builtin("n8n-nodes-document-generator", "Render documents from templates"),
        NodePackageInfo::builtin("n8n-nodes-mcp", "Model Context Protocol client"),
        NodePackageInfo::builtin("n8n-nodes-text-manipulation", "String transformations"),
    ]
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Deserialize)]
struct SearchObject {
    package: SearchPackage,
}

#[derive(Deserialize)]
struct SearchPackage {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    links: SearchLinks,
}

#[derive(Default, Deserialize)]
struct SearchLinks {
    #[serde(default)]
    npm: Option<String>,
}

/// Client for the registry's search endpoint
#[derive(Clone)]
pub struct PackageRegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for PackageRegistryClient {
    fn default() -> Self {
        Self::new(registry::BASE_URL)
    }
}

impl PackageRegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(registry::TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search community node packages; never fails.
    pub async fn search(&self, query: &str, size: Option<usize>) -> Vec<NodePackageInfo> {
        let size = size.unwrap_or(registry::DEFAULT_SIZE);
        match self.search_registry(query, size).await {
            Ok(packages) => packages,
            Err(e) => {
                log::warn!("Package registry search failed, using built-in list: {}", e);
                fallback(query, size)
            }
        }
    }

    async fn search_registry(
        &self,
        query: &str,
        size: usize,
    ) -> Result<Vec<NodePackageInfo>, reqwest::Error> {
        let text = format!("{} {}", registry::COMMUNITY_KEYWORD, query.trim());
        let response: SearchResponse = self
            .http
            .get(format!("{}/-/v1/search", self.base_url))
            .query(&[("text", text.trim().to_string()), ("size", size.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .objects
            .into_iter()
            .map(|o| NodePackageInfo {
                npm_url: o.package.links.npm,
                name: o.package.name,
                version: o.package.version,
                description: o.package.description,
            })
            .collect())
    }
}

fn fallback(query: &str, size: usize) -> Vec<NodePackageInfo> {
    let needle = query.trim().to_lowercase();
    builtin_packages()
        .into_iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.contains(&needle)
                || p
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .take(size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_search_restricts_to_community_keyword() {
        let router = Router::new().route(
            "/-/v1/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["text"], "keywords:n8n-community-node-package mail");
                assert_eq!(params["size"], "5");
                Json(serde_json::json!({
                    "objects": [{
                        "package": {
                            "name": "n8n-nodes-mail",
                            "version": "1.0.3",
                            "description": "Mail nodes",
                            "links": { "npm": "https://www.npmjs.com/package/n8n-nodes-mail" }
                        }
                    }]
                }))
            }),
        );
        let client = PackageRegistryClient::new(serve(router).await);

        let packages = client.search("mail", Some(5)).await;
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "n8n-nodes-mail");
        assert_eq!(packages[0].version.as_deref(), Some("1.0.3"));
        assert!(packages[0].npm_url.is_some());
    }

    #[tokio::test]
    async fn test_error_status_falls_back() {
        let router = Router::new().route(
            "/-/v1/search",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = PackageRegistryClient::new(serve(router).await);

        let packages = client.search("browser", None).await;
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "n8n-nodes-browserless");
    }

    #[tokio::test]
    async fn test_unreachable_registry_returns_builtin_list() {
        let client = PackageRegistryClient::new("http://127.0.0.1:1");
        let packages = client.search("", None).await;
        assert_eq!(packages.len(), builtin_packages().len());
    }

    #[test]
    fn test_fallback_respects_size_and_case() {
        assert_eq!(fallback("", 2).len(), 2);
        assert_eq!(fallback("MAIL", 20)[0].name, "n8n-nodes-10kcodeurs");
        assert!(fallback("no-such-thing", 20).is_empty());
    }
}
