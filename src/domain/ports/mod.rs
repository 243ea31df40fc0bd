//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod condition_evaluator;
pub mod file_system;
pub mod hook_runner;
pub mod operation_events;
pub mod plugin;
pub mod target_prompt;
pub mod tool_runner;

pub use condition_evaluator::{ConditionContext, ConditionEvaluator};
pub use file_system::FileSystem;
pub use hook_runner::HookRunner;
pub use operation_events::{NoopEventSink, OperationEvent, OperationEventSink};
pub use plugin::{
    BatchReport, DeleteContext, DownloadContext, ListContext, Plugin, PluginCapabilities,
    UploadContext,
};
pub use target_prompt::TargetPrompt;
pub use tool_runner::{ToolInvocation, ToolOutput, ToolRunner};
