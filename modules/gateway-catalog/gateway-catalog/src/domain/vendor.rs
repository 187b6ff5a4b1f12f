//! Vendor request shaping: base URL and authentication headers per gateway.
//!
//! Expects a config whose secrets are already opened.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gateway_catalog_sdk::{AdpAiGatewayConfig, ApigConfig, GatewayConfig, HigressConfig};
use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::config::GatewayCatalogConfig;
use crate::domain::cipher::is_blank;
use crate::domain::error::DomainError;

const ADP_ADMIN_USER: &str = "admin";
const REGION_PLACEHOLDER: &str = "{region}";

/// Where and how to call a gateway's admin API.
#[derive(Clone)]
pub struct VendorEndpoint {
    /// Scheme, host and port, without trailing slash.
    pub base_url: String,
    /// Authentication headers, marked sensitive.
    pub headers: HeaderMap,
}

impl VendorEndpoint {
    /// Join `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl std::fmt::Debug for VendorEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(HeaderName::as_str).collect();
        f.debug_struct("VendorEndpoint")
            .field("base_url", &self.base_url)
            .field("headers", &names)
            .finish()
    }
}

/// Shape the endpoint for the active variant.
///
/// # Errors
/// Returns [`DomainError::InvalidParameter`] if the config lacks what the
/// vendor needs (location or credentials) or carries unusable header data.
pub fn endpoint_for(
    config: &GatewayConfig,
    settings: &GatewayCatalogConfig,
) -> Result<VendorEndpoint, DomainError> {
    match config {
        GatewayConfig::ApigApi(c) | GatewayConfig::ApigAi(c) => Ok(apig_endpoint(c, settings)),
        GatewayConfig::AdpAiGateway(c) => adp_endpoint(c, settings),
        GatewayConfig::Higress(c) => higress_endpoint(c),
    }
}

// Request signing is left to the vendor SDK; only the location is shaped here.
fn apig_endpoint(c: &ApigConfig, settings: &GatewayCatalogConfig) -> VendorEndpoint {
    VendorEndpoint {
        base_url: trim_base(&settings.apig.endpoint_template.replace(REGION_PLACEHOLDER, &c.region)),
        headers: HeaderMap::new(),
    }
}

fn higress_endpoint(c: &HigressConfig) -> Result<VendorEndpoint, DomainError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = c.access_token.as_deref().filter(|t| !is_blank(t)) {
        headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {token}"), "accessToken")?);
    }
    Ok(VendorEndpoint {
        base_url: format!("http://{}:{}", c.host.trim(), c.port),
        headers,
    })
}

fn adp_endpoint(
    c: &AdpAiGatewayConfig,
    settings: &GatewayCatalogConfig,
) -> Result<VendorEndpoint, DomainError> {
    let base = match (c.base_url.as_deref(), c.region.as_deref()) {
        (Some(url), _) if !is_blank(url) => url.trim().to_owned(),
        (_, Some(region)) if !is_blank(region) => settings
            .adp
            .endpoint_template
            .replace(REGION_PLACEHOLDER, region.trim()),
        _ => return Err(DomainError::invalid_parameter("baseUrl")),
    };
    let base = if base.starts_with("http://") || base.starts_with("https://") {
        base
    } else {
        format!("http://{base}")
    };
    let port = c.port.unwrap_or(settings.adp.default_port);

    Ok(VendorEndpoint {
        base_url: format!("{}:{port}", trim_base(&base)),
        headers: adp_auth_headers(c)?,
    })
}

/// Seed-derived Basic auth when a seed is present, the configured headers
/// otherwise.
fn adp_auth_headers(c: &AdpAiGatewayConfig) -> Result<HeaderMap, DomainError> {
    let mut headers = HeaderMap::new();

    if let Some(seed) = c.auth_seed.as_deref().filter(|s| !is_blank(s)) {
        let password = Zeroizing::new(hex::encode(Sha256::digest(seed.as_bytes())));
        let credentials = Zeroizing::new(format!("{ADP_ADMIN_USER}:{}", password.as_str()));
        let encoded = Zeroizing::new(STANDARD.encode(credentials.as_bytes()));
        headers.insert(
            AUTHORIZATION,
            sensitive(&format!("Basic {}", encoded.as_str()), "authSeed")?,
        );
        return Ok(headers);
    }

    for header in &c.auth_headers {
        let (Some(key), Some(value)) = (header.key.as_deref(), header.value.as_deref()) else {
            continue;
        };
        if is_blank(key) || is_blank(value) {
            continue;
        }
        let name = HeaderName::from_bytes(key.trim().as_bytes())
            .map_err(|_| DomainError::invalid_parameter("authHeaders"))?;
        headers.append(name, sensitive(value, "authHeaders")?);
    }

    if headers.is_empty() {
        return Err(DomainError::invalid_parameter("authSeed"));
    }
    Ok(headers)
}

fn sensitive(value: &str, field: &str) -> Result<HeaderValue, DomainError> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| DomainError::invalid_parameter(field))?;
    value.set_sensitive(true);
    Ok(value)
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
