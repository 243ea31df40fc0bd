//! Configuration module for targetsync
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (TARGETSYNC_*)
//! 3. Explicit `--config` file, else project config (.targetsync/config.toml)
//! 4. User config (<config dir>/targetsync/config.toml)
//! 5. Built-in defaults (lowest priority)

mod env_validator;
mod loader;
mod types;

pub use env_validator::{levenshtein, EnvVarValidator};
pub use loader::{
    config_candidates, load_for_project, with_overrides_from, ConfigWarning, LoadedConfig,
    PROJECT_CONFIG,
};
pub use types::{
    Config, PackageConfig, ProxyConfig, ProxyDestinationConfig, SettingsConfig, TargetConfig,
    WorkspaceConfig,
};
