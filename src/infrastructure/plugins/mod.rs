//! Built-in plugins
//!
//! Plugins are registered from this static table at startup.

mod compiler;
mod local;

use std::sync::Arc;

pub use compiler::CompilerPlugin;
pub use local::LocalPlugin;

use crate::application::PluginRegistry;
use crate::domain::ports::{FileSystem, ToolRunner};

/// Registry holding the `local` and `compiler` plugins
pub fn builtin_registry(fs: Arc<dyn FileSystem>, runner: Arc<dyn ToolRunner>) -> PluginRegistry {
    PluginRegistry::new()
        .with("local", Arc::new(LocalPlugin::new(fs.clone())))
        .with("compiler", Arc::new(CompilerPlugin::new(runner, fs)))
}
