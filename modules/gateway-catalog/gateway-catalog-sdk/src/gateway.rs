//! Gateway configuration model.
//!
//! A gateway is one of a closed set of vendor products. Each vendor has its
//! own connection and credential shape; [`GatewayConfig`] is the tagged union
//! over those shapes, so reading the payload of the wrong vendor cannot be
//! expressed.
//!
//! Fields documented as *secret* are encrypted before the config is stored
//! and decrypted only for the duration of an outbound call.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const REDACTED: &str = "[REDACTED]";

/// Supported gateway products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayType {
    /// Cloud-native API gateway.
    ApigApi,
    /// AI gateway hosted on the cloud API gateway platform.
    ApigAi,
    /// ADP AI gateway.
    AdpAiGateway,
    /// Higress service-mesh gateway.
    Higress,
}

impl GatewayType {
    /// Every supported gateway type.
    pub const ALL: [Self; 4] = [Self::ApigApi, Self::ApigAi, Self::AdpAiGateway, Self::Higress];

    /// Stable discriminator string (the serialized form).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApigApi => "APIG_API",
            Self::ApigAi => "APIG_AI",
            Self::AdpAiGateway => "ADP_AI_GATEWAY",
            Self::Higress => "HIGRESS",
        }
    }

    /// Short label shown in the portal.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ApigApi => "API",
            Self::ApigAi => "AI",
            Self::AdpAiGateway => "ADP_AI_GATEWAY",
            Self::Higress => "Higress",
        }
    }

    #[must_use]
    pub const fn is_higress(self) -> bool {
        matches!(self, Self::Higress)
    }

    /// True for every gateway managed through the cloud platform APIs.
    #[must_use]
    pub const fn is_apig(self) -> bool {
        match self {
            Self::ApigApi | Self::ApigAi | Self::AdpAiGateway => true,
            Self::Higress => false,
        }
    }

    #[must_use]
    pub const fn is_ai_gateway(self) -> bool {
        match self {
            Self::ApigAi | Self::AdpAiGateway => true,
            Self::ApigApi | Self::Higress => false,
        }
    }

    #[must_use]
    pub const fn is_adp_ai_gateway(self) -> bool {
        matches!(self, Self::AdpAiGateway)
    }
}

impl fmt::Display for GatewayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloud API gateway connection (shared by `APIG_API` and `APIG_AI`).
///
/// All four fields are required for an active config.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApigConfig {
    /// Secret.
    #[serde(default)]
    pub access_key: String,
    /// Secret.
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub gateway_id: String,
}

impl fmt::Debug for ApigConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApigConfig")
            .field("access_key", &REDACTED)
            .field("secret_key", &REDACTED)
            .field("region", &self.region)
            .field("gateway_id", &self.gateway_id)
            .finish()
    }
}

/// Higress controller connection.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HigressConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_policy: Option<String>,
    /// Console address, when the console differs from the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl HigressConfig {
    /// `host:port:accessToken`, used to key controller sessions.
    #[must_use]
    pub fn unique_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.host,
            self.port,
            self.access_token.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Debug for HigressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HigressConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token", &self.access_token.as_ref().map(|_| REDACTED))
            .field("jwt_policy", &self.jwt_policy)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// A static header sent with every ADP admin call. The value is secret.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AuthHeader {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("key", &self.key)
            .field("value", &self.value.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// ADP AI gateway connection.
///
/// When `base_url` is absent the endpoint is derived from `region`.
/// Authentication uses `auth_seed` when present, the ordered `auth_headers`
/// otherwise.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdpAiGatewayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_seed: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth_headers: Vec<AuthHeader>,
}

impl fmt::Debug for AdpAiGatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdpAiGatewayConfig")
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field("port", &self.port)
            .field("auth_seed", &self.auth_seed.as_ref().map(|_| REDACTED))
            .field("auth_headers", &self.auth_headers)
            .finish()
    }
}

/// Vendor-specific gateway configuration, discriminated by gateway type.
///
/// Serializes adjacently tagged: `{"gatewayType": "...", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "gatewayType",
    content = "config",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum GatewayConfig {
    ApigApi(ApigConfig),
    ApigAi(ApigConfig),
    AdpAiGateway(AdpAiGatewayConfig),
    Higress(HigressConfig),
}

impl GatewayConfig {
    #[must_use]
    pub const fn gateway_type(&self) -> GatewayType {
        match self {
            Self::ApigApi(_) => GatewayType::ApigApi,
            Self::ApigAi(_) => GatewayType::ApigAi,
            Self::AdpAiGateway(_) => GatewayType::AdpAiGateway,
            Self::Higress(_) => GatewayType::Higress,
        }
    }

    #[must_use]
    pub const fn as_apig(&self) -> Option<&ApigConfig> {
        match self {
            Self::ApigApi(c) | Self::ApigAi(c) => Some(c),
            Self::AdpAiGateway(_) | Self::Higress(_) => None,
        }
    }

    #[must_use]
    pub const fn as_higress(&self) -> Option<&HigressConfig> {
        match self {
            Self::Higress(c) => Some(c),
            Self::ApigApi(_) | Self::ApigAi(_) | Self::AdpAiGateway(_) => None,
        }
    }

    #[must_use]
    pub const fn as_adp_ai_gateway(&self) -> Option<&AdpAiGatewayConfig> {
        match self {
            Self::AdpAiGateway(c) => Some(c),
            Self::ApigApi(_) | Self::ApigAi(_) | Self::Higress(_) => None,
        }
    }
}

/// The declared gateway type has no payload for that type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("gateway type {gateway_type} declares no {expected} payload")]
pub struct InconsistentGatewayConfig {
    pub gateway_type: GatewayType,
    pub expected: &'static str,
}

/// Inbound shape of a gateway registration: a type tag plus one optional
/// payload per vendor. Only the payload matching `gateway_type` is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayIdentityConfig {
    pub gateway_type: GatewayType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apig_config: Option<ApigConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub higress_config: Option<HigressConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adp_ai_gateway_config: Option<AdpAiGatewayConfig>,
}

impl GatewayIdentityConfig {
    /// Select the payload declared by `gateway_type`.
    ///
    /// # Errors
    /// Returns [`InconsistentGatewayConfig`] if that payload is missing.
    pub fn to_config(&self) -> Result<GatewayConfig, InconsistentGatewayConfig> {
        let missing = |expected| InconsistentGatewayConfig {
            gateway_type: self.gateway_type,
            expected,
        };
        match self.gateway_type {
            GatewayType::ApigApi => self
                .apig_config
                .clone()
                .map(GatewayConfig::ApigApi)
                .ok_or_else(|| missing("apigConfig")),
            GatewayType::ApigAi => self
                .apig_config
                .clone()
                .map(GatewayConfig::ApigAi)
                .ok_or_else(|| missing("apigConfig")),
            GatewayType::AdpAiGateway => self
                .adp_ai_gateway_config
                .clone()
                .map(GatewayConfig::AdpAiGateway)
                .ok_or_else(|| missing("adpAiGatewayConfig")),
            GatewayType::Higress => self
                .higress_config
                .clone()
                .map(GatewayConfig::Higress)
                .ok_or_else(|| missing("higressConfig")),
        }
    }
}

impl TryFrom<GatewayIdentityConfig> for GatewayConfig {
    type Error = InconsistentGatewayConfig;

    fn try_from(value: GatewayIdentityConfig) -> Result<Self, Self::Error> {
        value.to_config()
    }
}

impl From<GatewayConfig> for GatewayIdentityConfig {
    fn from(config: GatewayConfig) -> Self {
        let gateway_type = config.gateway_type();
        let mut out = Self {
            gateway_type,
            apig_config: None,
            higress_config: None,
            adp_ai_gateway_config: None,
        };
        match config {
            GatewayConfig::ApigApi(c) | GatewayConfig::ApigAi(c) => out.apig_config = Some(c),
            GatewayConfig::AdpAiGateway(c) => out.adp_ai_gateway_config = Some(c),
            GatewayConfig::Higress(c) => out.higress_config = Some(c),
        }
        out
    }
}

/// Canonical identity of a gateway configuration.
///
/// The canonical string contains every field of the active variant,
/// secrets included, so `Debug` and `Display` only show a short fingerprint.
/// Lookups use the full [`fingerprint`](Self::fingerprint).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GatewayIdentity {
    canonical: String,
}

impl GatewayIdentity {
    /// Wrap an already canonical serialization.
    #[must_use]
    pub fn from_canonical(canonical: String) -> Self {
        Self { canonical }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.canonical
    }

    /// SHA-256 of the canonical form, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.canonical.as_bytes()))
    }

    /// First 8 bytes of the fingerprint, for logs and debug output.
    #[must_use]
    pub fn short_fingerprint(&self) -> String {
        let digest = Sha256::digest(self.canonical.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for GatewayIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GatewayIdentity")
            .field(&self.short_fingerprint())
            .finish()
    }
}

impl fmt::Display for GatewayIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_fingerprint())
    }
}

/// A gateway accepted into the catalog. `config` holds sealed secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredGateway {
    pub identity: GatewayIdentity,
    pub config: GatewayConfig,
}

impl RegisteredGateway {
    #[must_use]
    pub const fn gateway_type(&self) -> GatewayType {
        self.config.gateway_type()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn apig() -> ApigConfig {
        ApigConfig {
            access_key: "ak1".to_owned(),
            secret_key: "sk1".to_owned(),
            region: "cn-hangzhou".to_owned(),
            gateway_id: "gw-1".to_owned(),
        }
    }

    #[test]
    fn gateway_type_serializes_as_discriminator() {
        for ty in GatewayType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn predicates_follow_vendor_families() {
        assert!(GatewayType::Higress.is_higress());
        assert!(!GatewayType::Higress.is_apig());
        assert!(GatewayType::AdpAiGateway.is_apig());
        assert!(GatewayType::AdpAiGateway.is_ai_gateway());
        assert!(GatewayType::ApigAi.is_ai_gateway());
        assert!(!GatewayType::ApigApi.is_ai_gateway());
        assert!(GatewayType::AdpAiGateway.is_adp_ai_gateway());
        assert_eq!(GatewayType::Higress.label(), "Higress");
    }

    #[test]
    fn wire_shape_selects_declared_payload() {
        let json = r#"{
            "gatewayType": "APIG_AI",
            "apigConfig": {"accessKey": "ak1", "secretKey": "sk1", "region": "cn-hangzhou", "gatewayId": "gw-1"},
            "higressConfig": {"host": "h", "port": 8001}
        }"#;
        let wire: GatewayIdentityConfig = serde_json::from_str(json).unwrap();
        let config = wire.to_config().unwrap();
        assert_eq!(config, GatewayConfig::ApigAi(apig()));
        assert!(config.as_higress().is_none());
    }

    #[test]
    fn missing_declared_payload_is_inconsistent() {
        let wire = GatewayIdentityConfig {
            gateway_type: GatewayType::Higress,
            apig_config: Some(apig()),
            higress_config: None,
            adp_ai_gateway_config: None,
        };
        let err = GatewayConfig::try_from(wire).unwrap_err();
        assert_eq!(err.gateway_type, GatewayType::Higress);
        assert_eq!(err.expected, "higressConfig");
    }

    #[test]
    fn typed_config_round_trips_through_wire_shape() {
        let config = GatewayConfig::AdpAiGateway(AdpAiGatewayConfig {
            base_url: Some("adp.local".to_owned()),
            port: Some(8080),
            auth_headers: vec![AuthHeader::new("X-Token", "t")],
            ..Default::default()
        });
        let wire = GatewayIdentityConfig::from(config.clone());
        assert_eq!(wire.gateway_type, GatewayType::AdpAiGateway);
        assert_eq!(wire.to_config().unwrap(), config);
    }

    #[test]
    fn debug_redacts_secret_fields() {
        let higress = HigressConfig {
            host: "higress.local".to_owned(),
            port: 8001,
            access_token: Some("tok-secret".to_owned()),
            password: Some("pw-secret".to_owned()),
            ..Default::default()
        };
        let configs = [
            format!("{:?}", GatewayConfig::ApigApi(apig())),
            format!("{:?}", GatewayConfig::Higress(higress)),
            format!(
                "{:?}",
                AdpAiGatewayConfig {
                    auth_seed: Some("seed-secret".to_owned()),
                    auth_headers: vec![AuthHeader::new("X-Key", "hdr-secret")],
                    ..Default::default()
                }
            ),
        ];
        for out in &configs {
            for secret in ["ak1", "sk1", "tok-secret", "pw-secret", "seed-secret", "hdr-secret"] {
                assert!(!out.contains(secret), "{out} leaks {secret}");
            }
        }
        assert!(configs[0].contains("cn-hangzhou"));
    }

    #[test]
    fn higress_unique_key() {
        let higress = HigressConfig {
            host: "10.0.0.1".to_owned(),
            port: 8001,
            access_token: Some("tok".to_owned()),
            ..Default::default()
        };
        assert_eq!(higress.unique_key(), "10.0.0.1:8001:tok");
    }

    #[test]
    fn identity_display_shows_fingerprint_only() {
        let identity = GatewayIdentity::from_canonical(r#"{"secret":"sk1"}"#.to_owned());
        let shown = format!("{identity} {identity:?}");
        assert!(!shown.contains("sk1"));
        assert_eq!(format!("{identity}"), identity.short_fingerprint());
    }

    #[test]
    fn fingerprint_is_the_full_digest() {
        let canonical = r#"{"config":{"host":"h","port":1},"gatewayType":"HIGRESS"}"#;
        let identity = GatewayIdentity::from_canonical(canonical.to_owned());
        let fingerprint = identity.fingerprint();
        assert_eq!(fingerprint, hex::encode(Sha256::digest(canonical.as_bytes())));
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.starts_with(&identity.short_fingerprint()));
        assert_eq!(identity.short_fingerprint().len(), 16);
    }
}
