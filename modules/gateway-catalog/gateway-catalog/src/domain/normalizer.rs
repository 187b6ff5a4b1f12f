//! Route/registry normalization into catalog projections.
//!
//! Pure functions of the source record. `to_detail` is built on `to_card`, so
//! both projections agree on every shared field.

use gateway_catalog_sdk::{
    BackendEndpoint, HttpRouteRecord, McpCapability, McpCard, McpDetail, RegistryServerRecord,
    ToolSpec, VersionDetail,
};

use crate::domain::cipher::is_blank;
use crate::domain::error::DomainError;

const DEFAULT_ROUTE_PROTOCOL: &str = "HTTP";
const DEFAULT_FRONT_PROTOCOL: &str = "http";
const DEPLOYED: &str = "Deployed";

/// An upstream record that can be projected into the catalog.
pub trait McpCatalogSource {
    /// Summary projection.
    ///
    /// # Errors
    /// Returns [`DomainError::DataInvalid`] if the record has no id or name.
    fn to_card(&self) -> Result<McpCard, DomainError>;

    /// Full projection.
    ///
    /// # Errors
    /// Returns [`DomainError::DataInvalid`] if the record has no id or name.
    fn to_detail(&self) -> Result<McpDetail, DomainError>;
}

fn required(value: Option<&str>, record: &str, field: &str) -> Result<String, DomainError> {
    match value {
        Some(v) if !is_blank(v) => Ok(v.to_owned()),
        _ => Err(DomainError::data_invalid(format!("{record} has no {field}"))),
    }
}

impl McpCatalogSource for RegistryServerRecord {
    fn to_card(&self) -> Result<McpCard, DomainError> {
        let id = required(self.id.as_deref(), "registry record", "id")?;
        let name = required(self.name.as_deref(), "registry record", "name")?;
        let version = self
            .version
            .clone()
            .or_else(|| self.version_detail.as_ref().and_then(|v| v.version.clone()));

        Ok(McpCard {
            id,
            mcp_name: name.clone(),
            name,
            protocol: self.protocol.clone(),
            front_protocol: self.front_protocol.clone(),
            description: self.description.clone(),
            repository: self.repository.clone(),
            version,
            version_detail: self.version_detail.clone(),
            remote_server_config: self.remote_server_config.clone(),
            local_server_config: self.local_server_config.clone(),
            enabled: self.enabled,
            capabilities: self.capabilities.clone(),
        })
    }

    fn to_detail(&self) -> Result<McpDetail, DomainError> {
        Ok(McpDetail {
            card: self.to_card()?,
            backend_endpoints: self.backend_endpoints.clone(),
            tool_spec: self.tool_spec.clone(),
            all_versions: self.all_versions.clone(),
            namespace_id: self.namespace_id.clone(),
        })
    }
}

impl McpCatalogSource for HttpRouteRecord {
    fn to_card(&self) -> Result<McpCard, DomainError> {
        let id = required(self.route_id.as_deref(), "route", "routeId")?;
        let name = required(self.name.as_deref(), "route", "name")?;
        let info = self.mcp_server_info.as_ref();

        let mcp_name = info
            .and_then(|i| i.mcp_server_name.as_deref())
            .filter(|n| !is_blank(n))
            .map_or_else(|| name.clone(), str::to_owned);
        let protocol = info
            .and_then(|i| i.mcp_route_config.as_ref())
            .and_then(|c| c.protocol.clone())
            .unwrap_or_else(|| DEFAULT_ROUTE_PROTOCOL.to_owned());
        let front_protocol = self
            .domain_infos
            .first()
            .and_then(|d| d.protocol.as_deref())
            .map_or_else(|| DEFAULT_FRONT_PROTOCOL.to_owned(), str::to_ascii_lowercase);
        let enabled = self
            .deploy_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(DEPLOYED));
        let version_detail = self.version.as_ref().map(|v| VersionDetail {
            version: Some(v.clone()),
            release_date: None,
            is_latest: Some(true),
        });

        Ok(McpCard {
            id,
            name,
            mcp_name,
            protocol: Some(protocol),
            front_protocol: Some(front_protocol),
            description: self.description.clone(),
            repository: None,
            version: self.version.clone(),
            version_detail,
            remote_server_config: None,
            local_server_config: None,
            enabled,
            capabilities: vec![McpCapability::Tool],
        })
    }

    fn to_detail(&self) -> Result<McpDetail, DomainError> {
        let card = self.to_card()?;
        let path = self
            .route_match
            .as_ref()
            .and_then(|m| m.path.as_ref())
            .and_then(|p| p.value.clone());
        let backend_endpoints = self
            .domain_infos
            .iter()
            .filter_map(|d| {
                let address = d.name.as_deref().filter(|n| !is_blank(n))?;
                let protocol = d.protocol.as_deref().map(str::to_ascii_lowercase);
                let port = if protocol.as_deref() == Some("https") { 443 } else { 80 };
                Some(BackendEndpoint {
                    address: address.to_owned(),
                    port,
                    path: path.clone(),
                    protocol,
                })
            })
            .collect();
        let tool_spec = self
            .mcp_server_info
            .as_ref()
            .and_then(|i| i.tools_config.clone())
            .map(ToolSpec::Raw);

        // Gateway-managed routes have no namespace and no version history.
        Ok(McpDetail {
            card,
            backend_endpoints,
            tool_spec,
            all_versions: Vec::new(),
            namespace_id: None,
        })
    }
}
