#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Gateway Catalog SDK
//!
//! This crate provides the public contract of the gateway catalog: the
//! vendor gateway configuration model, the catalog projections produced from
//! upstream route and registry records, the error catalog and the uniform
//! response envelope used at the boundary.
//!
//! ## Gateway configuration
//!
//! - `GatewayConfig` - tagged union over the supported gateway vendors
//! - `GatewayIdentityConfig` - inbound wire shape (type tag plus optional payloads)
//! - `GatewayIdentity` - canonical identity derived from the active variant
//!
//! ## Catalog projections
//!
//! - `McpCard` - summary projection for list views
//! - `McpDetail` - full projection (card plus endpoints, tools, versions)
//!
//! ## Usage
//!
//! ```ignore
//! use gateway_catalog_sdk::{GatewayIdentityConfig, Response};
//!
//! let request: GatewayIdentityConfig = serde_json::from_str(body)?;
//! let registered = service.register(&request)?;
//! let envelope = Response::ok(registered.identity.fingerprint());
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod response;
pub mod upstream;

// Gateway config model
pub use gateway::{
    AdpAiGatewayConfig, ApigConfig, AuthHeader, GatewayConfig, GatewayIdentity,
    GatewayIdentityConfig, GatewayType, HigressConfig, InconsistentGatewayConfig,
    RegisteredGateway,
};

// Catalog projections
pub use catalog::{
    BackendEndpoint, McpCapability, McpCard, McpDetail, McpTool, Repository, StructuredToolSpec,
    ToolSpec, VersionDetail,
};

// Upstream records
pub use upstream::{
    DomainInfo, HttpRouteRecord, McpRouteConfig, McpServerInfo, PathMatch, RegistryServerRecord,
    RouteMatch,
};

// Error catalog
pub use error::{BusinessException, ErrDef, ErrorCode};

// Response envelope
pub use response::{Response, SUCCESS_CODE};
