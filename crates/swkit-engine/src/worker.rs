//! The cache worker: lifecycle, interception, and the revalidation race.

use std::sync::Arc;
use std::time::Duration;

use swkit_common::{Result, SwkitError};
use swkit_net::{FetchClient, NetError, Request};
use swkit_store::{RequestIdentity, StoreRegistry, StoredResponse};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, trace, warn};

use crate::clients::{Client, ClientRegistry};
use crate::config::WorkerConfig;
use crate::fetch::{snapshot_of, FetchEvent, FetchResponse};
use crate::lifecycle::{WorkerEvent, WorkerState};
use crate::policy;

/// A cache worker instance.
///
/// One worker serves one deployed version. `install` seeds the versioned
/// store, `activate` claims open clients, and `handle_fetch` applies the
/// stale-while-revalidate policy to each intercepted request.
pub struct CacheWorker {
    config: Arc<WorkerConfig>,
    registry: Arc<StoreRegistry>,
    net: Arc<FetchClient>,
    clients: RwLock<ClientRegistry>,
    state: RwLock<WorkerState>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl CacheWorker {
    /// Create a worker over a store registry and fetch client.
    ///
    /// Returns the worker and the receiving end of its event channel.
    pub fn new(
        config: WorkerConfig,
        registry: Arc<StoreRegistry>,
        net: Arc<FetchClient>,
    ) -> (Self, mpsc::UnboundedReceiver<WorkerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            Self {
                config: Arc::new(config),
                registry,
                net,
                clients: RwLock::new(ClientRegistry::new()),
                state: RwLock::new(WorkerState::Installing),
                event_tx,
            },
            event_rx,
        )
    }

    /// The worker's configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
        debug!(?state, "worker state changed");
        let _ = self.event_tx.send(WorkerEvent::StateChange { state });
    }

    /// Register an open client context.
    pub async fn register_client(&self, client: Client) {
        self.clients.write().await.add(client);
    }

    /// Number of clients this worker controls.
    pub async fn controlled_clients(&self) -> usize {
        self.clients.read().await.controlled_count()
    }

    /// Install this worker: open the current-version store and populate it
    /// with the precache set.
    ///
    /// Any precache failure fails the whole install; the worker becomes
    /// redundant and never serves. On success the worker requests immediate
    /// takeover instead of waiting for prior instances to drain.
    pub async fn install(&self) -> Result<()> {
        let state = self.state().await;
        if state != WorkerState::Installing {
            return Err(SwkitError::lifecycle(format!(
                "cannot install from state {state:?}"
            )));
        }

        let store_name = self.config.store_name();
        let store = self.registry.open(&store_name).await;
        info!(
            store = %store_name,
            urls = self.config.precache_urls.len(),
            "installing"
        );

        for url in &self.config.precache_urls {
            let request = Request::get(url.clone()).timeout(self.config.network_timeout);
            let response = match self.net.fetch(request).await {
                Ok(response) if response.ok() => response,
                Ok(response) => {
                    self.set_state(WorkerState::Redundant).await;
                    return Err(SwkitError::install(format!(
                        "precache fetch for {url} returned {}",
                        response.status
                    )));
                }
                Err(err) => {
                    self.set_state(WorkerState::Redundant).await;
                    return Err(SwkitError::install_with_source(
                        format!("precache fetch for {url} failed"),
                        err,
                    ));
                }
            };

            let identity = RequestIdentity::get(url.clone());
            store.write().await.put(identity, snapshot_of(&response));
        }

        let _ = self.event_tx.send(WorkerEvent::PrecacheComplete {
            entries: self.config.precache_urls.len(),
        });
        self.set_state(WorkerState::Installed).await;
        let _ = self.event_tx.send(WorkerEvent::TakeoverRequested);
        Ok(())
    }

    /// Activate this worker: claim every registered client context so
    /// interception starts without a reload.
    pub async fn activate(&self) -> Result<()> {
        let state = self.state().await;
        if state != WorkerState::Installed {
            return Err(SwkitError::lifecycle(format!(
                "cannot activate from state {state:?}"
            )));
        }

        self.set_state(WorkerState::Activating).await;
        let count = self.clients.write().await.claim();
        info!(clients = count, "claimed open clients");
        let _ = self.event_tx.send(WorkerEvent::ClientsClaimed { count });
        self.set_state(WorkerState::Active).await;
        Ok(())
    }

    /// Handle an intercepted request.
    ///
    /// Returns `None` for ineligible requests, which are not intercepted at
    /// all; the caller performs the plain network call. Eligible requests
    /// always receive exactly one response.
    pub async fn handle_fetch(&self, event: FetchEvent) -> Option<FetchResponse> {
        if !policy::is_eligible(&event.request, &self.config) {
            trace!(url = %event.request.url, "request not eligible, passing through");
            return None;
        }

        Some(self.serve(event.request).await)
    }

    async fn serve(&self, request: Request) -> FetchResponse {
        let identity = RequestIdentity::new(request.method.clone(), request.url.clone());

        let store = match self.registry.get(&self.config.store_name()).await {
            Ok(store) => store,
            Err(err) => {
                warn!(identity = %identity, error = %err, "store unavailable, serving fallback");
                return FetchResponse::fallback(&self.config);
            }
        };

        let cached = store.read().await.lookup(&identity).cloned();

        // The cached deadline is shorter: with something to show already,
        // the network gets less time before the refresh is abandoned.
        let deadline = if cached.is_some() {
            self.config.cached_hit_timeout
        } else {
            self.config.network_timeout
        };

        if let Some(hit) = &cached {
            if policy::serve_instantly(&request, &self.config) {
                trace!(identity = %identity, "instant cache hit, refreshing in background");
                let race = Self::race_network(
                    Arc::clone(&self.net),
                    Arc::clone(&self.registry),
                    Arc::clone(&self.config),
                    request,
                    identity,
                    None,
                    deadline,
                );
                // Only the cache side effect of the refresh matters.
                tokio::spawn(async move {
                    let _ = race.await;
                });
                return FetchResponse::from_cached(hit);
            }
        }

        Self::race_network(
            Arc::clone(&self.net),
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
            request,
            identity,
            cached,
            deadline,
        )
        .await
    }

    /// The revalidation race: one deadline-bound network attempt, with
    /// best-effort write-back and deterministic fallback.
    async fn race_network(
        net: Arc<FetchClient>,
        registry: Arc<StoreRegistry>,
        config: Arc<WorkerConfig>,
        request: Request,
        identity: RequestIdentity,
        cached: Option<StoredResponse>,
        deadline: Duration,
    ) -> FetchResponse {
        let request = request.timeout(deadline);

        match net.fetch(request).await {
            Ok(response) => {
                let snapshot = snapshot_of(&response);
                if snapshot.is_storable() {
                    // Caching is best-effort and never blocks the response.
                    match registry.get(&config.store_name()).await {
                        Ok(store) => store.write().await.put(identity.clone(), snapshot),
                        Err(err) => {
                            warn!(identity = %identity, error = %err, "cache write-back failed")
                        }
                    }
                } else {
                    debug!(
                        identity = %identity,
                        status = %response.status,
                        "response outside storable range, not cached"
                    );
                }
                FetchResponse::from_network(response)
            }
            Err(err) => {
                let err = match err {
                    NetError::Timeout(d) => SwkitError::Timeout(d),
                    other => SwkitError::network_with_source("network attempt failed", other),
                };
                debug!(
                    identity = %identity,
                    category = err.category(),
                    error = %err,
                    "race lost, resolving from cache or fallback"
                );
                match cached {
                    Some(hit) => FetchResponse::from_cached(&hit),
                    None => FetchResponse::fallback(&config),
                }
            }
        }
    }
}
