//! Gateway config validation.

use gateway_catalog_sdk::{AdpAiGatewayConfig, ApigConfig, GatewayConfig, HigressConfig};

use crate::domain::cipher::is_blank;
use crate::domain::error::DomainError;

/// Check that the active variant carries everything an outbound call needs.
///
/// # Errors
/// Returns [`DomainError::InvalidParameter`] naming the first offending field.
pub fn validate(config: &GatewayConfig) -> Result<(), DomainError> {
    match config {
        GatewayConfig::ApigApi(c) | GatewayConfig::ApigAi(c) => validate_apig(c),
        GatewayConfig::AdpAiGateway(c) => validate_adp(c),
        GatewayConfig::Higress(c) => validate_higress(c),
    }
}

fn validate_apig(c: &ApigConfig) -> Result<(), DomainError> {
    for (field, value) in [
        ("accessKey", &c.access_key),
        ("secretKey", &c.secret_key),
        ("region", &c.region),
        ("gatewayId", &c.gateway_id),
    ] {
        if is_blank(value) {
            return Err(DomainError::invalid_parameter(field));
        }
    }
    Ok(())
}

fn validate_higress(c: &HigressConfig) -> Result<(), DomainError> {
    if is_blank(&c.host) {
        return Err(DomainError::invalid_parameter("host"));
    }
    if c.port == 0 {
        return Err(DomainError::invalid_parameter("port"));
    }
    Ok(())
}

fn validate_adp(c: &AdpAiGatewayConfig) -> Result<(), DomainError> {
    let present = |v: Option<&String>| v.is_some_and(|s| !is_blank(s));

    if !present(c.base_url.as_ref()) && !present(c.region.as_ref()) {
        return Err(DomainError::invalid_parameter("baseUrl"));
    }
    if c.port == Some(0) {
        return Err(DomainError::invalid_parameter("port"));
    }
    let has_header = c
        .auth_headers
        .iter()
        .any(|h| present(h.key.as_ref()) && present(h.value.as_ref()));
    if !present(c.auth_seed.as_ref()) && !has_header {
        return Err(DomainError::invalid_parameter("authSeed"));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use gateway_catalog_sdk::AuthHeader;

    fn invalid_field(config: &GatewayConfig) -> String {
        match validate(config) {
            Err(DomainError::InvalidParameter { name }) => name,
            other => panic!("expected invalid parameter, got {other:?}"),
        }
    }

    #[test]
    fn apig_requires_all_four_fields() {
        let full = ApigConfig {
            access_key: "ak1".to_owned(),
            secret_key: "sk1".to_owned(),
            region: "cn-hangzhou".to_owned(),
            gateway_id: "gw-1".to_owned(),
        };
        assert!(validate(&GatewayConfig::ApigApi(full.clone())).is_ok());

        let mut no_gateway = full;
        no_gateway.gateway_id = " ".to_owned();
        assert_eq!(invalid_field(&GatewayConfig::ApigAi(no_gateway)), "gatewayId");
    }

    #[test]
    fn higress_requires_host_and_port() {
        let mut c = HigressConfig {
            host: "higress.local".to_owned(),
            port: 8001,
            ..Default::default()
        };
        assert!(validate(&GatewayConfig::Higress(c.clone())).is_ok());
        c.port = 0;
        assert_eq!(invalid_field(&GatewayConfig::Higress(c.clone())), "port");
        c.host = String::new();
        assert_eq!(invalid_field(&GatewayConfig::Higress(c)), "host");
    }

    #[test]
    fn adp_requires_location_and_credentials() {
        let mut c = AdpAiGatewayConfig {
            region: Some("cn-beijing".to_owned()),
            auth_headers: vec![AuthHeader {
                key: Some("X-Token".to_owned()),
                value: None,
            }],
            ..Default::default()
        };
        assert_eq!(invalid_field(&GatewayConfig::AdpAiGateway(c.clone())), "authSeed");

        c.auth_seed = Some("seed".to_owned());
        assert!(validate(&GatewayConfig::AdpAiGateway(c.clone())).is_ok());

        c.port = Some(0);
        assert_eq!(invalid_field(&GatewayConfig::AdpAiGateway(c.clone())), "port");

        c.port = None;
        c.region = None;
        assert_eq!(invalid_field(&GatewayConfig::AdpAiGateway(c)), "baseUrl");
    }
}
