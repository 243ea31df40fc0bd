//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Components
//!
//! - `PluginRegistry` - static table of plugins keyed by target type
//! - `OperationController` - dispatches batches and checks aggregate results
//! - `Session` - owns workspaces, plugins and proxies; runs hooks

pub mod operations;
pub mod plugin_registry;
pub mod session;

pub use operations::{BatchSummary, OperationController};
pub use plugin_registry::{PluginRegistry, ANY_TARGET_TYPE};
pub use session::{Session, TargetOutcome, TransferPlan};
