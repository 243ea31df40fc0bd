//! targetsync - multi-target file deployment engine
//!
//! Decides which configured targets a workspace file goes to (include and
//! exclude globs, platform restrictions, conditional expressions), drives
//! per-file upload/download/delete lifecycles through target-type plugins,
//! compiles sources through external compiler tools and relays TCP
//! connections to several destinations at once.
//!
//! ## Layers
//!
//! - `domain` - entities, value objects, ports and pure services
//! - `application` - plugin registry, operation controller, session
//! - `infrastructure` - file system, compilers, plugins, proxy
//! - `presentation` - session factory and output rendering
//! - `config` - TOML configuration
//! - `watcher` - deploy on save

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;
pub mod watcher;

// Re-exports for convenience
pub use application::{BatchSummary, OperationController, PluginRegistry, Session, TargetOutcome};
pub use config::Config;
pub use domain::entities::{Package, Target, Workspace};
pub use domain::value_objects::{CancellationFlag, FileFilter, OperationKind};
pub use error::{SyncError, SyncResult};
pub use infrastructure::proxy::{ProxyRegistry, TcpProxy};
