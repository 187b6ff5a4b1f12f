//! Gateway catalog module configuration.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::secret::SecretString;

/// Gateway catalog module configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayCatalogConfig {
    pub encryption: EncryptionConfig,
    pub http: OutboundHttpConfig,
    pub adp: AdpEndpointConfig,
    pub apig: ApigEndpointConfig,
}

impl GatewayCatalogConfig {
    /// Environment prefix; nested keys are separated by `__`,
    /// e.g. `GATEWAY_CATALOG__ENCRYPTION__ROOT_KEY`.
    pub const ENV_PREFIX: &'static str = "GATEWAY_CATALOG__";

    /// Load defaults, then the optional YAML file, then the environment.
    ///
    /// # Errors
    /// Returns [`DomainError::ConfigurationInvalid`] if a source cannot be
    /// parsed or contains unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(Self::ENV_PREFIX).split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| DomainError::configuration_invalid(e.to_string()))?;
        tracing::debug!(
            root_key_set = config.encryption.root_key.is_some(),
            on_crypto_error = ?config.encryption.on_crypto_error,
            max_idle_connections = config.http.max_idle_connections,
            "gateway catalog config loaded"
        );
        Ok(config)
    }
}

/// Credential cipher settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptionConfig {
    /// Root secret the cipher key is derived from. Absence only fails at
    /// first cipher use.
    pub root_key: Option<SecretString>,
    pub on_crypto_error: CryptoErrorPolicy,
}

/// What the cipher does when encryption or decryption fails for a reason
/// other than a missing root key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CryptoErrorPolicy {
    /// Log and return the input unchanged.
    #[default]
    PassThrough,
    /// Return a typed error.
    Reject,
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutboundHttpConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Idle clients kept for reuse.
    pub max_idle_connections: usize,
    pub max_idle_lifetime_secs: u64,
    pub user_agent: String,
}

impl Default for OutboundHttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            max_idle_connections: 10,
            max_idle_lifetime_secs: 300,
            user_agent: concat!("gateway-catalog/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl OutboundHttpConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Upper bound for a whole request: connect, write and read phases.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.connect_timeout_ms
                .saturating_add(self.write_timeout_ms)
                .saturating_add(self.read_timeout_ms),
        )
    }

    #[must_use]
    pub const fn max_idle_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_idle_lifetime_secs)
    }
}

/// ADP AI gateway endpoint derivation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdpEndpointConfig {
    /// `{region}` is replaced by the gateway region.
    pub endpoint_template: String,
    pub default_port: u16,
}

impl Default for AdpEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "http://{region}.adp-ai-gateway.aliyuncs.com".to_owned(),
            default_port: 80,
        }
    }
}

/// Cloud API gateway endpoint derivation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApigEndpointConfig {
    /// `{region}` is replaced by the gateway region.
    pub endpoint_template: String,
}

impl Default for ApigEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "https://apig.{region}.aliyuncs.com".to_owned(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_vendor_client_settings() {
        let config = GatewayCatalogConfig::default();
        assert!(config.encryption.root_key.is_none());
        assert_eq!(config.encryption.on_crypto_error, CryptoErrorPolicy::PassThrough);
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.http.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.http.max_idle_connections, 10);
        assert_eq!(config.http.max_idle_lifetime(), Duration::from_secs(300));
        assert_eq!(config.adp.default_port, 80);
    }

    #[test]
    fn load_without_sources_yields_defaults() {
        temp_env::with_vars_unset(
            [
                "GATEWAY_CATALOG__ENCRYPTION__ROOT_KEY",
                "GATEWAY_CATALOG__HTTP__MAX_IDLE_CONNECTIONS",
            ],
            || {
                let config = GatewayCatalogConfig::load(None).unwrap();
                assert!(config.encryption.root_key.is_none());
                assert_eq!(config.http.max_idle_connections, 10);
            },
        );
    }

    #[test]
    fn env_overrides_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "encryption:\n  root_key: from-yaml\n  on_crypto_error: reject\nhttp:\n  max_idle_connections: 4\n"
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("GATEWAY_CATALOG__ENCRYPTION__ROOT_KEY", Some("from-env")),
                ("GATEWAY_CATALOG__HTTP__MAX_IDLE_CONNECTIONS", None),
            ],
            || {
                let config = GatewayCatalogConfig::load(Some(file.path())).unwrap();
                let root = config.encryption.root_key.as_ref().unwrap();
                assert_eq!(root.expose(), "from-env");
                assert_eq!(config.encryption.on_crypto_error, CryptoErrorPolicy::Reject);
                assert_eq!(config.http.max_idle_connections, 4);
                assert_eq!(config.http.read_timeout_ms, 5_000);
            },
        );
    }

    #[test]
    fn root_key_accepts_typed_env_values() {
        for raw in ["true", "1.5", "42"] {
            temp_env::with_var("GATEWAY_CATALOG__ENCRYPTION__ROOT_KEY", Some(raw), || {
                let config = GatewayCatalogConfig::load(None).unwrap();
                assert_eq!(config.encryption.root_key.as_ref().unwrap().expose(), raw);
            });
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  max_idle: 4\n").unwrap();
        temp_env::with_var_unset("GATEWAY_CATALOG__HTTP__MAX_IDLE_CONNECTIONS", || {
            let err = GatewayCatalogConfig::load(Some(file.path())).unwrap_err();
            assert!(matches!(err, DomainError::ConfigurationInvalid { .. }));
        });
    }

    #[test]
    fn debug_redacts_root_key() {
        let config = GatewayCatalogConfig {
            encryption: EncryptionConfig {
                root_key: Some(SecretString::new("super-secret-root")),
                on_crypto_error: CryptoErrorPolicy::PassThrough,
            },
            ..Default::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret-root"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
