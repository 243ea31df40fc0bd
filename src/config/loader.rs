//! Configuration loading and lookup

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

use super::env_validator::{levenshtein, EnvVarValidator};
use super::types::Config;

/// Project-level config, relative to the workspace directory
pub const PROJECT_CONFIG: &str = ".targetsync/config.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// A configuration together with where it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration was read from, `None` for defaults
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> SyncResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| SyncError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Candidate config files for a project, most specific first
pub fn config_candidates(project_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![project_dir.join(PROJECT_CONFIG)];
    if let Some(user_config_dir) = dirs::config_dir() {
        candidates.push(user_config_dir.join("targetsync/config.toml"));
    }
    candidates
}

/// Load the configuration for a project.
///
/// An explicit path must exist. Otherwise the first existing candidate from
/// [`config_candidates`] is used, falling back to defaults. Environment
/// overrides are applied last.
pub fn load_for_project(project_dir: &Path, explicit: Option<&Path>) -> SyncResult<LoadedConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_candidates(project_dir)
            .into_iter()
            .find(|candidate| candidate.is_file()),
    };

    let Some(source) = source else {
        debug!(dir = %project_dir.display(), "no configuration file, using defaults");
        return Ok(LoadedConfig {
            config: with_env_overrides(Config::default()),
            ..LoadedConfig::default()
        });
    };

    let (config, warnings) = load_with_warnings(&source)?;
    for warning in &warnings {
        warn!(%warning, "configuration");
    }
    debug!(file = %source.display(), targets = config.targets.len(), "configuration loaded");

    Ok(LoadedConfig {
        config: with_env_overrides(config),
        source: Some(source),
        warnings,
    })
}

/// Apply environment variable overrides (TARGETSYNC_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`
pub fn with_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // TARGETSYNC_PLATFORM
    if let Some(platform) = lookup("TARGETSYNC_PLATFORM").filter(|p| !p.trim().is_empty()) {
        config.settings.platform = Some(platform.trim().to_string());
    }

    // TARGETSYNC_PROXY_PORT
    if let Some(port) = lookup("TARGETSYNC_PROXY_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.settings.proxy_port = Some(port),
            Err(_) => warn!(value = %port, "ignoring invalid TARGETSYNC_PROXY_PORT"),
        }
    }

    // TARGETSYNC_FAST_CHECK
    if let Some(value) = lookup("TARGETSYNC_FAST_CHECK") {
        let validator = EnvVarValidator::new(
            "TARGETSYNC_FAST_CHECK",
            &["true", "false", "1", "0", "yes", "no"],
        );
        config.settings.fast_check_on_save = validator.parse(
            &value,
            parse_flag,
            config.settings.fast_check_on_save,
        );
    }

    config
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "workspace",
        "settings",
        "platform",
        "fast_check_on_save",
        "proxy_port",
        "targets",
        "packages",
        "proxies",
        "name",
        "root",
        "type",
        "description",
        "files",
        "exclude",
        "if",
        "platforms",
        "dir",
        "compiler",
        "tool",
        "encoding",
        "extension",
        "options",
        "before_deploy",
        "deployed",
        "deploy_on_save",
        "port",
        "bind",
        "destinations",
        "addr",
        "allow",
        "command",
        "args",
        "message",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}
