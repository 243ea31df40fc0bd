//! A listening TCP proxy that fans every connection out to its destinations
//!
//! `Stopped -> Starting -> Running -> Stopping -> Stopped`. Transitions are
//! decided under a short-lived lock that is never held across an `.await`;
//! `start()` and `stop()` return `false` when no transition happened.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::events::{log_proxy_event, ProxyEvent, TcpProxyDestination};
use super::tunnel::{run_tunnel, stopping};
use crate::error::SyncResult;

const EVENT_CAPACITY: usize = 256;

/// How long stopped tunnels get to close before they are aborted
const TUNNEL_GRACE: Duration = Duration::from_secs(2);

/// Decides whether a remote peer may open a tunnel
pub type RemoteFilter = Arc<dyn Fn(SocketAddr) -> bool + Send + Sync>;

/// Produces a human label for the proxy on behalf of one workspace
pub type NameResolver = Arc<dyn Fn() -> Option<ProxyLabel> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyLabel {
    pub name: String,
    pub description: Option<String>,
}

enum ProxyState {
    Stopped,
    Starting,
    Running {
        local_addr: SocketAddr,
        shutdown: watch::Sender<bool>,
        accept_loop: JoinHandle<()>,
    },
    Stopping,
}

#[derive(Default)]
struct Registrations {
    destinations: BTreeMap<u64, TcpProxyDestination>,
    filters: BTreeMap<u64, RemoteFilter>,
    name_resolvers: BTreeMap<u64, (String, NameResolver)>,
}

struct ProxyInner {
    port: u16,
    bind: IpAddr,
    state: Mutex<ProxyState>,
    registrations: Mutex<Registrations>,
    next_id: AtomicU64,
    events: broadcast::Sender<ProxyEvent>,
}

impl ProxyInner {
    fn state(&self) -> MutexGuard<'_, ProxyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn registrations(&self) -> MutexGuard<'_, Registrations> {
        self.registrations.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: ProxyEvent) {
        log_proxy_event(&event);
        let _ = self.events.send(event);
    }

    fn allows(&self, remote: SocketAddr) -> bool {
        let filters: Vec<RemoteFilter> = self.registrations().filters.values().cloned().collect();
        filters.is_empty() || filters.iter().any(|filter| filter(remote))
    }

    fn destinations(&self) -> Vec<TcpProxyDestination> {
        self.registrations().destinations.values().cloned().collect()
    }
}

/// Handle to one proxy; clones share the same listener and registrations
#[derive(Clone)]
pub struct TcpProxy {
    inner: Arc<ProxyInner>,
}

impl std::fmt::Debug for TcpProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpProxy")
            .field("port", &self.inner.port)
            .field("bind", &self.inner.bind)
            .field("running", &self.is_running())
            .finish()
    }
}

impl TcpProxy {
    /// Proxy listening on every interface. Port `0` binds an ephemeral port.
    pub fn new(port: u16) -> Self {
        Self::with_bind(port, IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    pub fn with_bind(port: u16, bind: IpAddr) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(ProxyInner {
                port,
                bind,
                state: Mutex::new(ProxyState::Stopped),
                registrations: Mutex::new(Registrations::default()),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Configured port
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    /// Bound address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.inner.state() {
            ProxyState::Running { local_addr, .. } => Some(*local_addr),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.inner.state(), ProxyState::Running { .. })
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProxyEvent> {
        self.inner.events.subscribe()
    }

    /// Bind the listener and start accepting.
    pub async fn start(&self) -> SyncResult<bool> {
        let Some(starting) = StartingGuard::begin(&self.inner) else {
            return Ok(false);
        };
        self.inner.emit(ProxyEvent::Starting {
            port: self.inner.port,
        });

        let bound = match TcpListener::bind((self.inner.bind, self.inner.port)).await {
            Ok(listener) => listener.local_addr().map(|addr| (listener, addr)),
            Err(e) => Err(e),
        };
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                drop(starting);
                warn!(port = self.inner.port, error = %e, "proxy failed to bind");
                self.inner.emit(ProxyEvent::Stopped {
                    port: self.inner.port,
                });
                return Err(e.into());
            }
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let accept_loop = tokio::spawn(accept_loop(
            Arc::downgrade(&self.inner),
            listener,
            shutdown_rx,
        ));
        starting.finish(ProxyState::Running {
            local_addr,
            shutdown,
            accept_loop,
        });

        info!(port = self.inner.port, %local_addr, "proxy listening");
        self.inner.emit(ProxyEvent::Started {
            port: self.inner.port,
            local_addr,
        });
        Ok(true)
    }

    /// Close the listener and every live tunnel.
    pub async fn stop(&self) -> SyncResult<bool> {
        let (shutdown, accept_loop) = {
            let mut state = self.inner.state();
            match std::mem::replace(&mut *state, ProxyState::Stopping) {
                ProxyState::Running {
                    shutdown,
                    accept_loop,
                    ..
                } => (shutdown, accept_loop),
                other => {
                    *state = other;
                    return Ok(false);
                }
            }
        };
        self.inner.emit(ProxyEvent::Stopping {
            port: self.inner.port,
        });

        let _ = shutdown.send(true);
        if let Err(e) = accept_loop.await {
            warn!(port = self.inner.port, error = %e, "proxy accept loop ended abnormally");
        }

        *self.inner.state() = ProxyState::Stopped;
        info!(port = self.inner.port, "proxy stopped");
        self.inner.emit(ProxyEvent::Stopped {
            port: self.inner.port,
        });
        Ok(true)
    }

    /// Start when stopped, stop when running.
    pub async fn toggle(&self) -> SyncResult<bool> {
        if self.is_running() {
            self.stop().await
        } else {
            self.start().await
        }
    }

    /// Relay new tunnels to `addr:port` as well. Dropping the handle removes it.
    pub fn add_destination(&self, addr: impl Into<String>, port: u16) -> ProxyRegistration {
        let id = self.next_id();
        self.inner
            .registrations()
            .destinations
            .insert(id, TcpProxyDestination::new(addr, port));
        self.registration(id)
    }

    /// Allow remotes accepted by `filter`. With no filters every remote is allowed.
    pub fn add_filter<F>(&self, filter: F) -> ProxyRegistration
    where
        F: Fn(SocketAddr) -> bool + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner
            .registrations()
            .filters
            .insert(id, Arc::new(filter));
        self.registration(id)
    }

    /// Register how `workspace` names this proxy.
    pub fn set_name_resolver<F>(&self, workspace: impl Into<String>, resolver: F) -> ProxyRegistration
    where
        F: Fn() -> Option<ProxyLabel> + Send + Sync + 'static,
    {
        let workspace = workspace.into();
        let id = self.next_id();
        let mut registrations = self.inner.registrations();
        registrations
            .name_resolvers
            .retain(|_, (owner, _)| *owner != workspace);
        registrations
            .name_resolvers
            .insert(id, (workspace, Arc::new(resolver)));
        drop(registrations);
        self.registration(id)
    }

    pub fn destinations(&self) -> Vec<TcpProxyDestination> {
        self.inner.destinations()
    }

    /// First label any workspace resolves, else `TCP proxy :<port>`.
    pub fn display_name(&self) -> String {
        self.label()
            .map(|label| label.name)
            .unwrap_or_else(|| format!("TCP proxy :{}", self.inner.port))
    }

    pub fn description(&self) -> Option<String> {
        self.label().and_then(|label| label.description)
    }

    fn label(&self) -> Option<ProxyLabel> {
        let resolvers: Vec<NameResolver> = self
            .inner
            .registrations()
            .name_resolvers
            .values()
            .map(|(_, resolver)| Arc::clone(resolver))
            .collect();
        resolvers
            .iter()
            .find_map(|resolve| resolve().filter(|label| !label.name.trim().is_empty()))
    }

    /// Drop every destination, filter and name resolver.
    pub fn clear(&self) {
        let mut registrations = self.inner.registrations();
        registrations.destinations.clear();
        registrations.filters.clear();
        registrations.name_resolvers.clear();
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn registration(&self, id: u64) -> ProxyRegistration {
        ProxyRegistration {
            proxy: Arc::downgrade(&self.inner),
            id,
        }
    }
}

/// Holds the `Starting` state; dropping it before `finish` returns to `Stopped`.
struct StartingGuard<'a> {
    inner: &'a ProxyInner,
    finished: bool,
}

impl<'a> StartingGuard<'a> {
    fn begin(inner: &'a ProxyInner) -> Option<Self> {
        let mut state = inner.state();
        if !matches!(*state, ProxyState::Stopped) {
            return None;
        }
        *state = ProxyState::Starting;
        Some(Self {
            inner,
            finished: false,
        })
    }

    fn finish(mut self, running: ProxyState) {
        *self.inner.state() = running;
        self.finished = true;
    }
}

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.inner.state();
        if matches!(*state, ProxyState::Starting) {
            *state = ProxyState::Stopped;
        }
    }
}

/// Keeps a destination, filter or name resolver registered while alive
#[must_use = "dropping the registration removes it immediately"]
pub struct ProxyRegistration {
    proxy: Weak<ProxyInner>,
    id: u64,
}

impl ProxyRegistration {
    /// Keep the registration for the lifetime of the proxy.
    pub fn forget(mut self) {
        self.proxy = Weak::new();
    }
}

impl Drop for ProxyRegistration {
    fn drop(&mut self) {
        if let Some(inner) = self.proxy.upgrade() {
            let mut registrations = inner.registrations();
            registrations.destinations.remove(&self.id);
            registrations.filters.remove(&self.id);
            registrations.name_resolvers.remove(&self.id);
        }
    }
}

async fn accept_loop(
    proxy: Weak<ProxyInner>,
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tunnels = JoinSet::new();

    loop {
        tokio::select! {
            _ = stopping(&mut shutdown) => break,
            Some(finished) = tunnels.join_next(), if !tunnels.is_empty() => {
                if let Err(e) = finished {
                    warn!(error = %e, "tunnel task ended abnormally");
                }
            }
            accepted = listener.accept() => {
                let Some(inner) = proxy.upgrade() else {
                    break;
                };
                let (stream, remote) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        debug!(port = inner.port, error = %e, "accept failed");
                        continue;
                    }
                };
                if !inner.allows(remote) {
                    inner.emit(ProxyEvent::Rejected {
                        port: inner.port,
                        remote,
                    });
                    drop(stream);
                    continue;
                }
                debug!(port = inner.port, %remote, "tunnel accepted");
                tunnels.spawn(run_tunnel(
                    stream,
                    remote,
                    inner.destinations(),
                    inner.events.clone(),
                    shutdown.clone(),
                ));
            }
        }
    }

    drop(listener);
    let drained = tokio::time::timeout(TUNNEL_GRACE, async {
        while let Some(finished) = tunnels.join_next().await {
            if let Err(e) = finished {
                warn!(error = %e, "tunnel task ended abnormally");
            }
        }
    })
    .await;
    if drained.is_err() {
        warn!(remaining = tunnels.len(), "tunnels did not close in time, aborting");
        tunnels.abort_all();
        while tunnels.join_next().await.is_some() {}
    }
}
