#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Gateway Catalog Module Implementation
//!
//! Registers heterogeneous API gateways and mirrors the MCP servers they
//! expose into catalog projections. It provides:
//!
//! - Canonical gateway identities for deduplication and client reuse
//! - Sealing of secret config fields under a lazily derived cipher key
//! - Normalization of gateway routes and registry entries into cards/details
//! - Bounded, reusable outbound clients for vendor admin APIs
//!
//! ## Architecture
//!
//! ```text
//!        GatewayIdentityConfig
//!                 │
//!                 ▼
//! ┌────────────────────────────────────┐
//! │       GatewayCatalogService        │
//! │  validate → identity → seal/store  │
//! └────────────────────────────────────┘
//!         │                   │
//!         ▼ open secrets      ▼ projections
//! ┌────────────────┐   ┌──────────────┐
//! │ Outbound       │──▶│ Normalizer   │
//! │ ClientManager  │   │ card/detail  │
//! └────────────────┘   └──────────────┘
//!         │
//!         ▼
//!   vendor admin API
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = GatewayCatalogConfig::load(Some(Path::new("gateway-catalog.yaml")))?;
//! let service = GatewayCatalogService::new(config);
//! service.init()?;
//!
//! let registered = service.register(&request)?;
//! let cards = service
//!     .fetch_mcp_cards(&registered.identity.fingerprint(), "/v1/mcp/servers")
//!     .await?;
//! ```

// === PUBLIC API (from SDK) ===
pub use gateway_catalog_sdk::{
    BusinessException, ErrorCode, GatewayConfig, GatewayIdentity, GatewayIdentityConfig,
    GatewayType, McpCard, McpDetail, RegisteredGateway, Response,
};

pub mod config;
pub mod domain;
pub mod infra;
pub mod secret;

pub use config::GatewayCatalogConfig;
pub use domain::cipher::{CipherError, CredentialCipher};
pub use domain::error::DomainError;
pub use domain::service::GatewayCatalogService;
pub use infra::http_client::{ClientHandle, OutboundClientManager};
pub use secret::SecretString;
