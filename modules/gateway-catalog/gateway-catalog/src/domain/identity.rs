//! Gateway identity resolution.
//!
//! The identity is the canonical JSON of `{"config": <active payload>,
//! "gatewayType": <type>}`: keys sorted bytewise at every level, no
//! whitespace, unset optional fields omitted. The type tag always takes part,
//! so equal payloads under different gateway types never collide.
//!
//! Resolution works on whatever representation it is given. Identities are
//! computed over plaintext secrets; sealed values are randomized and would
//! never compare equal.

use gateway_catalog_sdk::{GatewayConfig, GatewayIdentity, GatewayIdentityConfig};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Identity of the payload selected by `gatewayType`.
///
/// # Errors
/// Returns [`DomainError::ConfigurationInvalid`] if the declared payload is
/// missing.
pub fn resolve_identity(config: &GatewayIdentityConfig) -> Result<GatewayIdentity, DomainError> {
    let typed = config.to_config()?;
    identity_of(&typed)
}

/// Identity of an already typed config.
///
/// # Errors
/// Returns [`DomainError::Internal`] if the config cannot be serialized.
pub fn identity_of(config: &GatewayConfig) -> Result<GatewayIdentity, DomainError> {
    let value = serde_json::to_value(config)
        .map_err(|e| DomainError::Internal(format!("gateway config serialization: {e}")))?;
    let mut canonical = String::new();
    write_canonical(&value, &mut canonical);
    Ok(GatewayIdentity::from_canonical(canonical))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use gateway_catalog_sdk::{AdpAiGatewayConfig, ApigConfig, AuthHeader, GatewayType, HigressConfig};

    fn apig() -> ApigConfig {
        ApigConfig {
            access_key: "ak1".to_owned(),
            secret_key: "sk1".to_owned(),
            region: "cn-hangzhou".to_owned(),
            gateway_id: "gw-1".to_owned(),
        }
    }

    fn id(config: &GatewayConfig) -> String {
        identity_of(config).unwrap().into_string()
    }

    #[test]
    fn canonical_form_is_sorted_and_compact() {
        assert_eq!(
            id(&GatewayConfig::ApigApi(apig())),
            r#"{"config":{"accessKey":"ak1","gatewayId":"gw-1","region":"cn-hangzhou","secretKey":"sk1"},"gatewayType":"APIG_API"}"#
        );
    }

    #[test]
    fn wire_key_order_and_whitespace_do_not_matter() {
        let a: GatewayIdentityConfig = serde_json::from_str(
            r#"{"gatewayType":"HIGRESS","higressConfig":{"host":"h","port":8001,"accessToken":"t"}}"#,
        )
        .unwrap();
        let b: GatewayIdentityConfig = serde_json::from_str(
            r#"{ "higressConfig" : { "accessToken" : "t", "port" : 8001, "host" : "h" },
                 "gatewayType" : "HIGRESS" }"#,
        )
        .unwrap();
        assert_eq!(resolve_identity(&a).unwrap(), resolve_identity(&b).unwrap());
    }

    #[test]
    fn type_tag_always_participates() {
        let ids: Vec<String> = [
            GatewayConfig::ApigApi(apig()),
            GatewayConfig::ApigAi(apig()),
            GatewayConfig::Higress(HigressConfig::default()),
            GatewayConfig::AdpAiGateway(AdpAiGatewayConfig::default()),
        ]
        .iter()
        .map(id)
        .collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn apig_and_lookalike_higress_never_collide() {
        let apig_id = id(&GatewayConfig::ApigApi(apig()));
        let lookalike: GatewayIdentityConfig = serde_json::from_str(
            r#"{"gatewayType":"HIGRESS",
                "apigConfig":{"accessKey":"ak1","secretKey":"sk1","region":"cn-hangzhou","gatewayId":"gw-1"},
                "higressConfig":{"host":"cn-hangzhou","port":1,"accessToken":"ak1","jwtPolicy":"sk1","address":"gw-1"}}"#,
        )
        .unwrap();
        let higress_id = resolve_identity(&lookalike).unwrap().into_string();
        assert_ne!(apig_id, higress_id);
        assert!(higress_id.ends_with(r#""gatewayType":"HIGRESS"}"#));
    }

    #[test]
    fn equal_fields_equal_identity() {
        assert_eq!(
            id(&GatewayConfig::ApigApi(apig())),
            id(&GatewayConfig::ApigApi(apig()))
        );
    }

    #[test]
    fn any_field_change_changes_identity() {
        let base = id(&GatewayConfig::ApigApi(apig()));
        let mutations: [fn(&mut ApigConfig); 4] = [
            |c| c.access_key.push('x'),
            |c| c.secret_key.push('x'),
            |c| c.region.push('x'),
            |c| c.gateway_id.push('x'),
        ];
        for mutate in mutations {
            let mut changed = apig();
            mutate(&mut changed);
            assert_ne!(id(&GatewayConfig::ApigApi(changed)), base);
        }

        let adp = AdpAiGatewayConfig {
            base_url: Some("adp.local".to_owned()),
            auth_headers: vec![AuthHeader::new("X-Token", "v1")],
            ..Default::default()
        };
        let mut rotated = adp.clone();
        rotated.auth_headers[0].value = Some("v2".to_owned());
        assert_ne!(
            id(&GatewayConfig::AdpAiGateway(adp)),
            id(&GatewayConfig::AdpAiGateway(rotated))
        );
    }

    #[test]
    fn inconsistent_union_is_rejected() {
        let wire = GatewayIdentityConfig {
            gateway_type: GatewayType::AdpAiGateway,
            apig_config: Some(apig()),
            higress_config: None,
            adp_ai_gateway_config: None,
        };
        assert!(matches!(
            resolve_identity(&wire),
            Err(DomainError::ConfigurationInvalid { .. })
        ));
    }
}
