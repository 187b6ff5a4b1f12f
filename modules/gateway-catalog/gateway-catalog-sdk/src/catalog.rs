//! Catalog projections.
//!
//! Both projections are built fresh from an upstream record on every
//! normalization call and are never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Summary projection used by list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCard {
    pub id: String,
    pub name: String,
    /// Display name. Defaults to `name`.
    pub mcp_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_detail: Option<VersionDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_server_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_server_config: Option<Value>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: Vec<McpCapability>,
}

/// Full projection: every card field plus endpoints, tools and versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpDetail {
    #[serde(flatten)]
    pub card: McpCard,
    #[serde(default)]
    pub backend_endpoints: Vec<BackendEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_spec: Option<ToolSpec>,
    #[serde(default)]
    pub all_versions: Vec<VersionDetail>,
    /// Unset for gateway-managed routes, which have no namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

/// What an MCP server exposes. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum McpCapability {
    Tool,
    Prompt,
    Resource,
    #[serde(untagged)]
    Other(String),
}

/// Source repository reference. Vendor-specific extras are passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        alias = "releaseDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<String>,
    #[serde(default, alias = "isLatest", skip_serializing_if = "Option::is_none")]
    pub is_latest: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEndpoint {
    pub address: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Vendor keys such as `outputSchema` or `annotations`, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registry tool document with a typed tool list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredToolSpec {
    pub tools: Vec<McpTool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_meta: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tool specification.
///
/// Registry entries carry a structured tool list; gateway routes carry a
/// vendor-defined tools document that is passed through as-is. Keys outside
/// the typed fields survive a read and write unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolSpec {
    Structured(StructuredToolSpec),
    Raw(Value),
}

impl ToolSpec {
    /// Structured tool list, if any.
    #[must_use]
    pub fn tools(&self) -> &[McpTool] {
        match self {
            Self::Structured(spec) => &spec.tools,
            Self::Raw(_) => &[],
        }
    }
}
