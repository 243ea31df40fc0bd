//! Session Factory
//!
//! Creates sessions with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use crate::application::{OperationController, Session};
use crate::config::Config;
use crate::domain::entities::Workspace;
use crate::domain::ports::{FileSystem, OperationEventSink, ToolRunner};
use crate::domain::value_objects::{current_platform, normalize_platform};
use crate::infrastructure::{
    builtin_registry, ExpressionEvaluator, LocalFs, ProcessHookRunner, ProcessToolRunner,
    TracingEventSink,
};

/// Settings a session is created with
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Platform identifier, the host OS when unset
    pub platform: Option<String>,
    pub fast_check_on_save: bool,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            platform: config.settings.platform.clone(),
            fast_check_on_save: config.settings.fast_check_on_save,
        }
    }

    fn platform(&self) -> String {
        self.platform
            .as_deref()
            .map(normalize_platform)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(current_platform)
    }
}

/// Create a session over local disk, external tools and tracing events
///
/// This is the main entry point used by the CLI.
pub fn create_session(workspaces: Vec<Workspace>, options: &SessionOptions) -> Session {
    create_session_with(
        workspaces,
        options,
        Arc::new(LocalFs::new()),
        Arc::new(ProcessToolRunner),
        Arc::new(TracingEventSink),
    )
}

/// Create a session with explicit infrastructure
///
/// Useful for tests that swap the tool runner or record events.
pub fn create_session_with(
    workspaces: Vec<Workspace>,
    options: &SessionOptions,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ToolRunner>,
    events: Arc<dyn OperationEventSink>,
) -> Session {
    let registry = builtin_registry(fs.clone(), runner);
    let controller = OperationController::new(registry, fs, events);

    Session::new(
        workspaces,
        controller,
        Arc::new(ExpressionEvaluator),
        Arc::new(ProcessHookRunner),
        options.platform(),
    )
    .with_fast_check_on_save(options.fast_check_on_save)
}

/// Create the session for one project directory and its configuration
pub fn session_for_project(config: &Config, project_dir: &Path) -> Session {
    let workspace = config.to_workspace(project_dir);
    create_session(vec![workspace], &SessionOptions::from_config(config))
}
