//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - local file system and contained directory listings
//! - `compiler/` - compiler backends driven through external tools
//! - `plugins/` - built-in `local` and `compiler` target plugins
//! - `conditions/` - the `if` expression evaluator
//! - `process` - external tool and hook runners
//! - `events/` - operation event sinks
//! - `proxy/` - TCP tunnel proxy

pub mod compiler;
pub mod conditions;
pub mod events;
pub mod fs;
pub mod plugins;
pub mod process;
pub mod proxy;

// Re-export for convenience
pub use conditions::ExpressionEvaluator;
pub use events::TracingEventSink;
pub use fs::LocalFs;
pub use plugins::{builtin_registry, CompilerPlugin, LocalPlugin};
pub use process::{ProcessHookRunner, ProcessToolRunner};
pub use proxy::{ProxyRegistry, TcpProxy, DEFAULT_PROXY_PORT};
