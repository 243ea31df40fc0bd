//! Port-keyed proxy lookup owned by the session

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::tcp::TcpProxy;
use crate::error::{SyncError, SyncResult};

/// Port used when neither configuration nor environment names one
pub const DEFAULT_PROXY_PORT: u16 = 30904;

/// At most one proxy per port
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    proxies: Mutex<BTreeMap<u16, TcpProxy>>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn proxies(&self) -> MutexGuard<'_, BTreeMap<u16, TcpProxy>> {
        self.proxies.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up or create the proxy for `port`, listening on every interface.
    pub fn get_tcp_proxy(&self, port: i64) -> SyncResult<TcpProxy> {
        let port = u16::try_from(port).map_err(|_| SyncError::InvalidPort { port })?;
        Ok(self
            .proxies()
            .entry(port)
            .or_insert_with(|| TcpProxy::new(port))
            .clone())
    }

    /// Like [`get_tcp_proxy`](Self::get_tcp_proxy) with an explicit bind
    /// address. An existing proxy keeps the address it was created with.
    pub fn get_tcp_proxy_on(&self, port: u16, bind: IpAddr) -> TcpProxy {
        self.proxies()
            .entry(port)
            .or_insert_with(|| TcpProxy::with_bind(port, bind))
            .clone()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.proxies().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.proxies().len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies().is_empty()
    }

    /// Stop and forget every proxy.
    pub async fn dispose_all(&self) {
        let proxies: Vec<TcpProxy> = std::mem::take(&mut *self.proxies())
            .into_values()
            .collect();
        for proxy in proxies {
            if let Err(e) = proxy.stop().await {
                warn!(port = proxy.port(), error = %e, "failed to stop proxy");
            }
            proxy.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn lookup_is_idempotent() {
        let registry = ProxyRegistry::new();
        let a = registry.get_tcp_proxy(8080).unwrap();
        let _dest = a.add_destination("localhost", 3000);
        let b = registry.get_tcp_proxy(8080).unwrap();
        assert_eq!(b.destinations().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        let registry = ProxyRegistry::new();
        for port in [-1, 65_536, i64::MAX] {
            assert!(matches!(
                registry.get_tcp_proxy(port),
                Err(SyncError::InvalidPort { port: p }) if p == port
            ));
        }
        assert!(registry.get_tcp_proxy(0).is_ok());
        assert!(registry.get_tcp_proxy(65_535).is_ok());
    }

    #[tokio::test]
    async fn dispose_all_stops_and_clears() {
        let registry = ProxyRegistry::new();
        let proxy = registry.get_tcp_proxy_on(0, IpAddr::V4(Ipv4Addr::LOCALHOST));
        proxy.add_destination("localhost", 3000).forget();
        assert!(proxy.start().await.unwrap());

        registry.dispose_all().await;
        assert!(!proxy.is_running());
        assert!(proxy.destinations().is_empty());
        assert!(registry.is_empty());
    }
}
