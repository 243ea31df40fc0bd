//! Events published by a TCP proxy

use std::net::SocketAddr;

/// One destination a tunnel relays to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TcpProxyDestination {
    pub addr: String,
    pub port: u16,
}

impl TcpProxyDestination {
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }
}

impl std::fmt::Display for TcpProxyDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

/// Lifecycle and tunnel events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEvent {
    Starting {
        port: u16,
    },
    Started {
        port: u16,
        local_addr: SocketAddr,
    },
    Stopping {
        port: u16,
    },
    Stopped {
        port: u16,
    },
    /// Inbound connection refused by the remote filters
    Rejected {
        port: u16,
        remote: SocketAddr,
    },
    TunnelClosing {
        remote: SocketAddr,
    },
    TunnelClosed {
        remote: SocketAddr,
    },
    TargetOpening {
        remote: SocketAddr,
        destination: TcpProxyDestination,
    },
    TargetOpened {
        remote: SocketAddr,
        destination: TcpProxyDestination,
    },
    TargetClosing {
        remote: SocketAddr,
        destination: TcpProxyDestination,
    },
    TargetClosed {
        remote: SocketAddr,
        destination: TcpProxyDestination,
    },
    TargetError {
        remote: SocketAddr,
        destination: TcpProxyDestination,
        error: String,
    },
}

impl ProxyEvent {
    /// Stable event identifier
    pub fn name(&self) -> &'static str {
        match self {
            ProxyEvent::Starting { .. } => "starting",
            ProxyEvent::Started { .. } => "started",
            ProxyEvent::Stopping { .. } => "stopping",
            ProxyEvent::Stopped { .. } => "stopped",
            ProxyEvent::Rejected { .. } => "rejected",
            ProxyEvent::TunnelClosing { .. } => "tunnel.closing",
            ProxyEvent::TunnelClosed { .. } => "tunnel.closed",
            ProxyEvent::TargetOpening { .. } => "tunnel.target.opening",
            ProxyEvent::TargetOpened { .. } => "tunnel.target.opened",
            ProxyEvent::TargetClosing { .. } => "tunnel.target.closing",
            ProxyEvent::TargetClosed { .. } => "tunnel.target.closed",
            ProxyEvent::TargetError { .. } => "tunnel.target.error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProxyEvent::TargetError { .. } | ProxyEvent::Rejected { .. })
    }
}

/// Log a proxy event through `tracing`
pub fn log_proxy_event(event: &ProxyEvent) {
    if event.is_error() {
        tracing::warn!(event = event.name(), details = ?event, "proxy");
    } else {
        tracing::debug!(event = event.name(), details = ?event, "proxy");
    }
}
