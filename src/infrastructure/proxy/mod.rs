//! TCP tunnel proxy
//!
//! - `tcp` - listener lifecycle, filters and registrations
//! - `tunnel` - per-connection fan-out relay
//! - `registry` - port-keyed lookup
//! - `events` - published event types

mod events;
mod registry;
mod tcp;
mod tunnel;

pub use events::{log_proxy_event, ProxyEvent, TcpProxyDestination};
pub use registry::{ProxyRegistry, DEFAULT_PROXY_PORT};
pub use tcp::{NameResolver, ProxyLabel, ProxyRegistration, RemoteFilter, TcpProxy};
