//! Upstream records consumed by the normalizer.
//!
//! Required fields are modeled as `Option` so that a record missing them
//! still deserializes and the normalizer can reject it with a precise
//! data-invalid error instead of a generic decode failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{BackendEndpoint, McpCapability, Repository, ToolSpec, VersionDetail};

/// Cloud gateway HTTP route, optionally exposing an MCP server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteRecord {
    /// Required.
    #[serde(default)]
    pub route_id: Option<String>,
    /// Required.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `Deployed` when the route is live.
    #[serde(default)]
    pub deploy_status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub domain_infos: Vec<DomainInfo>,
    #[serde(default, rename = "match")]
    pub route_match: Option<RouteMatch>,
    #[serde(default)]
    pub mcp_server_info: Option<McpServerInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// `HTTP` or `HTTPS`, in any case.
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    #[serde(default)]
    pub path: Option<PathMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMatch {
    /// `Exact`, `Prefix` or `Regex`.
    #[serde(default, rename = "type")]
    pub match_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerInfo {
    #[serde(default)]
    pub mcp_server_name: Option<String>,
    #[serde(default)]
    pub mcp_route_config: Option<McpRouteConfig>,
    /// Vendor tools document, passed through unchanged.
    #[serde(default)]
    pub tools_config: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpRouteConfig {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub exposed_uri_path: Option<String>,
}

/// MCP registry server entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryServerRecord {
    /// Required.
    #[serde(default)]
    pub id: Option<String>,
    /// Required.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub front_protocol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default, alias = "version_detail")]
    pub version_detail: Option<VersionDetail>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, alias = "remote_server_config")]
    pub remote_server_config: Option<Value>,
    #[serde(default, alias = "local_server_config")]
    pub local_server_config: Option<Value>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: Vec<McpCapability>,
    #[serde(default)]
    pub backend_endpoints: Vec<BackendEndpoint>,
    #[serde(default)]
    pub tool_spec: Option<ToolSpec>,
    #[serde(default, alias = "all_versions")]
    pub all_versions: Vec<VersionDetail>,
    #[serde(default)]
    pub namespace_id: Option<String>,
}
