//! Outbound client manager.
//!
//! Hands out one HTTP client per acquisition, keyed by gateway fingerprint.
//! Released clients are parked in a bounded idle list and reused by the next
//! acquisition for the same gateway until their idle lifetime runs out.
//!
//! Each client keeps at most [`IDLE_SOCKETS_PER_CLIENT`] idle socket, so the
//! idle list bound is also the bound on idle connections. Evicted, expired and
//! shut down clients close their sockets when dropped. Vendor auth headers
//! live on the handle and are attached per request, so parked clients carry
//! no credentials.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use gateway_catalog_sdk::GatewayConfig;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::{GatewayCatalogConfig, OutboundHttpConfig};
use crate::domain::error::DomainError;
use crate::domain::identity::identity_of;
use crate::domain::vendor::{VendorEndpoint, endpoint_for};

/// Idle keep-alive sockets a single client may hold.
pub const IDLE_SOCKETS_PER_CLIENT: usize = 1;

struct IdleClient {
    key: String,
    client: reqwest::Client,
    released_at: Instant,
}

struct PoolInner {
    http: OutboundHttpConfig,
    idle: Mutex<VecDeque<IdleClient>>,
    next_id: AtomicU64,
    opened: AtomicUsize,
    active: AtomicUsize,
}

impl PoolInner {
    fn purge_expired(&self, idle: &mut VecDeque<IdleClient>) {
        let lifetime = self.http.max_idle_lifetime();
        let before = idle.len();
        idle.retain(|c| c.released_at.elapsed() < lifetime);
        let purged = before - idle.len();
        if purged > 0 {
            tracing::debug!(purged, "expired idle clients torn down");
        }
    }

    fn checkin(&self, key: String, client: reqwest::Client, handle_id: u64) {
        let max_idle = self.http.max_idle_connections;
        let mut idle = self.idle.lock();
        self.purge_expired(&mut idle);

        if max_idle == 0 {
            tracing::debug!(handle_id, "client torn down, idle pool disabled");
            return;
        }
        while idle.len() >= max_idle {
            if let Some(evicted) = idle.pop_front() {
                tracing::debug!(fingerprint = %evicted.key, "idle pool full, oldest client torn down");
            }
        }
        idle.push_back(IdleClient {
            key,
            client,
            released_at: Instant::now(),
        });
    }
}

/// Bounded, reusable outbound HTTP clients for gateway admin APIs.
///
/// Acquiring never fails because the idle pool is full; the bound applies to
/// what is kept after release.
#[derive(Clone)]
pub struct OutboundClientManager {
    settings: Arc<GatewayCatalogConfig>,
    inner: Arc<PoolInner>,
}

impl OutboundClientManager {
    #[must_use]
    pub fn new(settings: Arc<GatewayCatalogConfig>) -> Self {
        let inner = Arc::new(PoolInner {
            http: settings.http.clone(),
            idle: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            opened: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        });
        Self { settings, inner }
    }

    /// Acquire a client for `config`, whose secrets must be opened.
    ///
    /// # Errors
    /// - [`DomainError::InvalidParameter`] if the config cannot be shaped
    ///   into a vendor endpoint
    /// - [`DomainError::Internal`] if the HTTP client cannot be built
    #[instrument(skip_all, fields(gateway_type = %config.gateway_type()))]
    pub fn acquire(&self, config: &GatewayConfig) -> Result<ClientHandle, DomainError> {
        let key = identity_of(config)?.fingerprint();
        let endpoint = endpoint_for(config, &self.settings)?;

        let reused = {
            let mut idle = self.inner.idle.lock();
            self.inner.purge_expired(&mut idle);
            idle.iter()
                .position(|c| c.key == key)
                .and_then(|pos| idle.remove(pos))
                .map(|c| c.client)
        };
        let client = match reused {
            Some(client) => client,
            None => self.build_client()?,
        };

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.active.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(handle_id = id, fingerprint = %key, base_url = %endpoint.base_url, "client acquired");

        Ok(ClientHandle {
            id,
            key,
            endpoint,
            client: Some(client),
            pool: Arc::downgrade(&self.inner),
        })
    }

    /// Return a handle's client to the pool. Idempotent.
    pub fn release(&self, handle: &mut ClientHandle) {
        if !handle.is_released() && !Weak::ptr_eq(&handle.pool, &Arc::downgrade(&self.inner)) {
            tracing::warn!(handle_id = handle.id, "handle released through a foreign manager");
        }
        handle.release();
    }

    fn build_client(&self) -> Result<reqwest::Client, DomainError> {
        let http = &self.inner.http;
        let client = reqwest::Client::builder()
            .connect_timeout(http.connect_timeout())
            .read_timeout(http.read_timeout())
            .timeout(http.request_timeout())
            .pool_idle_timeout(http.max_idle_lifetime())
            .pool_max_idle_per_host(IDLE_SOCKETS_PER_CLIENT)
            .user_agent(http.user_agent.clone())
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build HTTP client: {e}")))?;
        self.inner.opened.fetch_add(1, Ordering::Relaxed);
        Ok(client)
    }

    /// Clients currently parked for reuse.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Handles acquired and not yet released.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.active.load(Ordering::Relaxed)
    }

    /// Clients built since the manager was created.
    #[must_use]
    pub fn opened_count(&self) -> usize {
        self.inner.opened.load(Ordering::Relaxed)
    }

    /// Tear down every idle client.
    pub fn shutdown(&self) {
        let drained = {
            let mut idle = self.inner.idle.lock();
            std::mem::take(&mut *idle)
        };
        tracing::debug!(torn_down = drained.len(), "outbound client pool shut down");
    }
}

/// Exclusive use of one outbound client. Released on drop.
pub struct ClientHandle {
    id: u64,
    key: String,
    endpoint: VendorEndpoint,
    client: Option<reqwest::Client>,
    pool: Weak<PoolInner>,
}

impl ClientHandle {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Fingerprint of the gateway this handle talks to.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn endpoint(&self) -> &VendorEndpoint {
        &self.endpoint
    }

    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.client.is_none()
    }

    /// GET `path` relative to the gateway base URL and decode the JSON body.
    ///
    /// # Errors
    /// - [`DomainError::AuthInvalid`] on HTTP 401
    /// - [`DomainError::Transport`] on timeout, connection failure or any
    ///   other non-success status
    /// - [`DomainError::DataInvalid`] if the body does not decode
    /// - [`DomainError::Internal`] if the handle was already released
    #[instrument(skip(self), fields(handle_id = self.id))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DomainError::Internal("client handle already released".to_owned()))?;

        let response = client
            .get(self.endpoint.url(path))
            .headers(self.endpoint.headers.clone())
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%status, "gateway rejected credentials");
            return Err(DomainError::AuthInvalid);
        }
        if !status.is_success() {
            return Err(DomainError::transport(format!("GET {path} returned {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::data_invalid(format!("GET {path}: undecodable body: {e}")))
    }

    /// Give the client back to the pool. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        match self.pool.upgrade() {
            Some(pool) => {
                pool.active.fetch_sub(1, Ordering::Relaxed);
                pool.checkin(self.key.clone(), client, self.id);
                tracing::debug!(handle_id = self.id, "client released");
            }
            None => {
                tracing::debug!(handle_id = self.id, "pool already gone, client torn down");
            }
        }
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.release();
    }
}

fn transport_error(path: &str, err: &reqwest::Error) -> DomainError {
    let cause = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    tracing::warn!(path, cause, "outbound call failed");
    DomainError::transport(format!("GET {path}: {cause}"))
}
