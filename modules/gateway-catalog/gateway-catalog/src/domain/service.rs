//! Gateway catalog domain service.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gateway_catalog_sdk::{
    GatewayConfig, GatewayIdentityConfig, GatewayType, HttpRouteRecord, McpCard,
    McpDetail, RegisteredGateway, RegistryServerRecord,
};
use tracing::{info, instrument};

use crate::config::GatewayCatalogConfig;
use crate::domain::cipher::CredentialCipher;
use crate::domain::error::DomainError;
use crate::domain::identity::identity_of;
use crate::domain::normalizer::McpCatalogSource;
use crate::domain::sealing::SecretFields;
use crate::domain::validate::validate;
use crate::infra::http_client::{ClientHandle, OutboundClientManager};

const GATEWAY: &str = "gateway";

/// Registers gateways, keeps their sealed configs and reads their catalogs.
///
/// Gateways are keyed by identity fingerprint. Stored configs always hold
/// sealed secrets; plaintext exists only for the duration of a call.
pub struct GatewayCatalogService {
    cipher: Arc<CredentialCipher>,
    clients: OutboundClientManager,
    gateways: DashMap<String, GatewayConfig>,
}

impl GatewayCatalogService {
    #[must_use]
    pub fn new(config: GatewayCatalogConfig) -> Self {
        let cipher = Arc::new(CredentialCipher::from_config(&config.encryption));
        Self::with_cipher(Arc::new(config), cipher)
    }

    #[must_use]
    pub fn with_cipher(config: Arc<GatewayCatalogConfig>, cipher: Arc<CredentialCipher>) -> Self {
        Self {
            cipher,
            clients: OutboundClientManager::new(config),
            gateways: DashMap::new(),
        }
    }

    /// Derive the cipher key now so a missing root key fails at startup.
    ///
    /// # Errors
    /// Returns [`DomainError::Cipher`] if no root key is configured.
    pub fn init(&self) -> Result<(), DomainError> {
        self.cipher.init()?;
        Ok(())
    }

    #[must_use]
    pub fn cipher(&self) -> &CredentialCipher {
        &self.cipher
    }

    #[must_use]
    pub const fn clients(&self) -> &OutboundClientManager {
        &self.clients
    }

    /// Validate, deduplicate, seal and store a gateway.
    ///
    /// # Errors
    /// - [`DomainError::ConfigurationInvalid`] if the declared payload is missing
    /// - [`DomainError::InvalidParameter`] if a required field is blank
    /// - [`DomainError::AlreadyExists`] if an identical gateway is registered
    /// - [`DomainError::Cipher`] if secrets cannot be sealed
    #[instrument(skip_all, fields(gateway_type = %request.gateway_type))]
    pub fn register(&self, request: &GatewayIdentityConfig) -> Result<RegisteredGateway, DomainError> {
        let config = request.to_config()?;
        validate(&config)?;
        let identity = identity_of(&config)?;
        let fingerprint = identity.fingerprint();
        // No shard lock may be held while sealing.
        let sealed = config.seal(&self.cipher)?;

        match self.gateways.entry(fingerprint) {
            Entry::Occupied(slot) => Err(DomainError::AlreadyExists {
                kind: GATEWAY,
                id: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(sealed.clone());
                info!(identity = %identity, "gateway registered");
                Ok(RegisteredGateway {
                    identity,
                    config: sealed,
                })
            }
        }
    }

    /// Sealed config of a registered gateway.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] for an unknown fingerprint.
    pub fn get(&self, fingerprint: &str) -> Result<GatewayConfig, DomainError> {
        self.gateways
            .get(fingerprint)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(fingerprint))
    }

    /// Fingerprints and types of every registered gateway.
    #[must_use]
    pub fn list(&self) -> Vec<(String, GatewayType)> {
        let mut out: Vec<(String, GatewayType)> = self
            .gateways
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().gateway_type()))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// # Errors
    /// Returns [`DomainError::NotFound`] for an unknown fingerprint.
    #[instrument(skip(self))]
    pub fn unregister(&self, fingerprint: &str) -> Result<(), DomainError> {
        if self.gateways.remove(fingerprint).is_none() {
            return Err(not_found(fingerprint));
        }
        info!("gateway unregistered");
        Ok(())
    }

    /// Open the gateway's secrets and acquire an outbound client for it.
    ///
    /// # Errors
    /// - [`DomainError::NotFound`] for an unknown fingerprint
    /// - [`DomainError::Cipher`] if secrets cannot be opened
    /// - any error of [`OutboundClientManager::acquire`]
    #[instrument(skip(self))]
    pub fn connect(&self, fingerprint: &str) -> Result<ClientHandle, DomainError> {
        let sealed = self.get(fingerprint)?;
        let opened = sealed.open(&self.cipher)?;
        self.clients.acquire(&opened)
    }

    /// Read a list of MCP registry entries and project them into cards.
    ///
    /// # Errors
    /// Connection and transport errors of [`connect`](Self::connect), or
    /// [`DomainError::DataInvalid`] for a malformed entry.
    #[instrument(skip(self))]
    pub async fn fetch_mcp_cards(&self, fingerprint: &str, path: &str) -> Result<Vec<McpCard>, DomainError> {
        let handle = self.connect(fingerprint)?;
        let records: Vec<RegistryServerRecord> = handle.get_json(path).await?;
        records.iter().map(McpCatalogSource::to_card).collect()
    }

    /// Read one MCP registry entry and project it into a detail.
    ///
    /// # Errors
    /// Connection and transport errors of [`connect`](Self::connect), or
    /// [`DomainError::DataInvalid`] for a malformed entry.
    #[instrument(skip(self))]
    pub async fn fetch_mcp_detail(&self, fingerprint: &str, path: &str) -> Result<McpDetail, DomainError> {
        let handle = self.connect(fingerprint)?;
        let record: RegistryServerRecord = handle.get_json(path).await?;
        record.to_detail()
    }

    /// Read the gateway's HTTP routes and project those exposing an MCP
    /// server into cards.
    ///
    /// # Errors
    /// Connection and transport errors of [`connect`](Self::connect), or
    /// [`DomainError::DataInvalid`] for a malformed route.
    #[instrument(skip(self))]
    pub async fn fetch_route_cards(&self, fingerprint: &str, path: &str) -> Result<Vec<McpCard>, DomainError> {
        let handle = self.connect(fingerprint)?;
        let routes: Vec<HttpRouteRecord> = handle.get_json(path).await?;
        let total = routes.len();
        let cards = routes
            .iter()
            .filter(|r| r.mcp_server_info.is_some())
            .map(McpCatalogSource::to_card)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(total, exposed = cards.len(), "routes normalized");
        Ok(cards)
    }
}

fn not_found(fingerprint: &str) -> DomainError {
    DomainError::NotFound {
        kind: GATEWAY,
        id: fingerprint.to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{CryptoErrorPolicy, EncryptionConfig};
    use crate::domain::cipher::{CipherError, RootKeySource};
    use crate::domain::identity::resolve_identity;
    use crate::secret::SecretString;
    use dashmap::try_result::TryResult;
    use gateway_catalog_sdk::{ApigConfig, HigressConfig};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};

    fn service() -> GatewayCatalogService {
        GatewayCatalogService::new(GatewayCatalogConfig {
            encryption: EncryptionConfig {
                root_key: Some(SecretString::new("portal-root-key")),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn apig_request() -> GatewayIdentityConfig {
        GatewayIdentityConfig::from(GatewayConfig::ApigApi(ApigConfig {
            access_key: "ak1".to_owned(),
            secret_key: "sk1".to_owned(),
            region: "cn-hangzhou".to_owned(),
            gateway_id: "gw-1".to_owned(),
        }))
    }

    #[test]
    fn register_stores_sealed_config() {
        let service = service();
        let registered = service.register(&apig_request()).unwrap();
        let fingerprint = registered.identity.fingerprint();

        let stored = service.get(&fingerprint).unwrap();
        assert_eq!(stored, registered.config);
        let apig = stored.as_apig().unwrap();
        assert_ne!(apig.access_key, "ak1");
        assert_eq!(apig.region, "cn-hangzhou");
        assert_eq!(
            registered.identity,
            resolve_identity(&apig_request()).unwrap()
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let service = service();
        let first = service.register(&apig_request()).unwrap();
        match service.register(&apig_request()) {
            Err(DomainError::AlreadyExists { kind, id }) => {
                assert_eq!(kind, "gateway");
                assert_eq!(id, first.identity.fingerprint());
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn concurrent_duplicates_register_once() {
        let service = service();
        let request = apig_request();
        let outcomes: Vec<Result<RegisteredGateway, DomainError>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| service.register(&request)))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, DomainError::AlreadyExists { .. }))
        );
        assert_eq!(service.list().len(), 1);
    }

    struct IndexObservingKey {
        service: Arc<OnceLock<Weak<GatewayCatalogService>>>,
        fingerprint: String,
        saw_lock: Arc<AtomicBool>,
    }

    impl RootKeySource for IndexObservingKey {
        fn root_key(&self) -> Option<SecretString> {
            if let Some(service) = self.service.get().and_then(Weak::upgrade) {
                let locked = matches!(service.gateways.try_get(&self.fingerprint), TryResult::Locked);
                self.saw_lock.fetch_or(locked, Ordering::SeqCst);
            }
            Some(SecretString::new("portal-root-key"))
        }
    }

    #[test]
    fn sealing_runs_outside_the_index_lock() {
        let slot = Arc::new(OnceLock::new());
        let saw_lock = Arc::new(AtomicBool::new(false));
        let source = IndexObservingKey {
            service: Arc::clone(&slot),
            fingerprint: resolve_identity(&apig_request()).unwrap().fingerprint(),
            saw_lock: Arc::clone(&saw_lock),
        };
        let cipher = Arc::new(CredentialCipher::new(source, CryptoErrorPolicy::PassThrough));
        let service = Arc::new(GatewayCatalogService::with_cipher(
            Arc::new(GatewayCatalogConfig::default()),
            cipher,
        ));
        slot.set(Arc::downgrade(&service)).unwrap();

        service.register(&apig_request()).unwrap();
        assert!(!saw_lock.load(Ordering::SeqCst));
        assert!(service.cipher().is_initialized());
    }

    #[test]
    fn invalid_config_is_not_stored() {
        let service = service();
        let request = GatewayIdentityConfig::from(GatewayConfig::Higress(HigressConfig::default()));
        assert!(matches!(
            service.register(&request),
            Err(DomainError::InvalidParameter { .. })
        ));
        assert!(service.list().is_empty());
    }

    #[test]
    fn missing_root_key_blocks_registration() {
        let service = GatewayCatalogService::new(GatewayCatalogConfig::default());
        assert!(matches!(service.init(), Err(DomainError::Cipher(CipherError::RootKeyMissing))));
        assert!(matches!(
            service.register(&apig_request()),
            Err(DomainError::Cipher(CipherError::RootKeyMissing))
        ));
        assert!(service.list().is_empty());
    }

    #[test]
    fn unregister_and_lookup_unknown() {
        let service = service();
        let fingerprint = service.register(&apig_request()).unwrap().identity.fingerprint();
        service.unregister(&fingerprint).unwrap();
        assert!(matches!(service.get(&fingerprint), Err(DomainError::NotFound { .. })));
        assert!(matches!(service.unregister(&fingerprint), Err(DomainError::NotFound { .. })));
        assert!(matches!(service.connect(&fingerprint), Err(DomainError::NotFound { .. })));
    }
}
