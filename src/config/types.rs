//! Configuration type definitions

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    CompilerSettings, Package, Target, TargetOperation, TargetSelection, Workspace,
};
use crate::domain::value_objects::{path, string_list, FileFilter};
use crate::error::SyncResult;
use crate::infrastructure::proxy::DEFAULT_PROXY_PORT;

use super::loader::{self, ConfigWarning};

/// `[workspace]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceConfig {
    /// Display name, defaults to the root directory name
    #[serde(default)]
    pub name: Option<String>,

    /// Root directory, relative paths resolve against the project directory
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// `[settings]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsConfig {
    /// Platform identifier used by `platforms` restrictions (host OS when unset)
    #[serde(default)]
    pub platform: Option<String>,

    /// Resolve on-save targets by path only
    #[serde(default)]
    pub fast_check_on_save: bool,

    /// Port for proxies that do not name one
    #[serde(default)]
    pub proxy_port: Option<u16>,
}

/// `[[targets]]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub files: Vec<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub exclude: Vec<String>,

    #[serde(default, rename = "if", deserialize_with = "string_list::deserialize")]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default)]
    pub compiler: Option<String>,

    #[serde(default)]
    pub tool: Option<String>,

    #[serde(default)]
    pub encoding: Option<String>,

    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub before_deploy: Vec<TargetOperation>,

    #[serde(default)]
    pub deployed: Vec<TargetOperation>,
}

impl TargetConfig {
    fn filter(&self) -> Option<FileFilter> {
        if self.files.is_empty() && self.exclude.is_empty() {
            None
        } else {
            Some(FileFilter::new(self.files.clone(), self.exclude.clone()))
        }
    }

    /// Build the target entity; the workspace stamps index and owner.
    pub fn to_target(&self) -> Target {
        let mut target = Target::new(self.name.trim(), &self.kind).with_conditions(self.conditions.clone());
        target.description = self.description.clone();
        target.platforms = self.platforms.clone();
        target.dir = self.dir.clone();
        target.before_deploy = self.before_deploy.clone();
        target.deployed = self.deployed.clone();
        if let Some(filter) = self.filter() {
            target.filters.push(filter);
        }
        if let Some(compiler) = &self.compiler {
            target.compiler = Some(CompilerSettings {
                compiler: compiler.clone(),
                files: self.files.clone(),
                exclude: self.exclude.clone(),
                encoding: self.encoding.clone(),
                extension: self.extension.clone(),
                tool: self.tool.clone(),
                options: self.options.clone(),
            });
        }
        target
    }
}

/// `[[packages]]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub files: Vec<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub exclude: Vec<String>,

    #[serde(default, rename = "if", deserialize_with = "string_list::deserialize")]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub targets: Vec<String>,

    #[serde(default)]
    pub deploy_on_save: TargetSelection,

    /// Overrides `settings.fast_check_on_save` for this package
    #[serde(default)]
    pub fast_check_on_save: Option<bool>,
}

impl PackageConfig {
    pub fn to_package(&self, default_fast_check: bool) -> Package {
        let mut package = Package::new(self.name.trim())
            .with_filter(FileFilter::new(self.files.clone(), self.exclude.clone()))
            .with_targets(self.targets.clone())
            .with_deploy_on_save(self.deploy_on_save.clone())
            .with_fast_check(self.fast_check_on_save.unwrap_or(default_fast_check));
        package.description = self.description.clone();
        package.conditions = self.conditions.clone();
        package.platforms = self.platforms.clone();
        package
    }
}

/// One `destinations` entry of a proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDestinationConfig {
    #[serde(default = "default_destination_addr")]
    pub addr: String,
    pub port: u16,
}

fn default_destination_addr() -> String {
    "localhost".to_string()
}

/// `[[proxies]]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    /// Listen port; `settings.proxy_port` or 30904 when unset
    #[serde(default)]
    pub port: Option<i64>,

    /// Listen address, every interface when unset
    #[serde(default)]
    pub bind: Option<IpAddr>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub destinations: Vec<ProxyDestinationConfig>,

    /// Remote addresses allowed to connect (`loopback` or an IP); empty allows all
    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub allow: Vec<String>,
}

impl ProxyConfig {
    pub fn bind_addr(&self) -> IpAddr {
        self.bind.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    /// Check a remote against the `allow` list.
    pub fn allows(&self, remote: SocketAddr) -> bool {
        let ip = remote.ip();
        self.allow
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .any(|entry| {
                if entry.eq_ignore_ascii_case("loopback") {
                    ip.is_loopback()
                } else {
                    entry.parse::<IpAddr>().is_ok_and(|allowed| allowed == ip)
                }
            })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub packages: Vec<PackageConfig>,

    #[serde(default)]
    pub proxies: Vec<ProxyConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SyncResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SyncResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (TARGETSYNC_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Port used by proxies without an explicit one
    pub fn default_proxy_port(&self) -> u16 {
        self.settings.proxy_port.unwrap_or(DEFAULT_PROXY_PORT)
    }

    /// Build the workspace rooted at `project_dir` (or `[workspace] root`).
    ///
    /// Targets and packages keep their declaration order as `index`.
    pub fn to_workspace(&self, project_dir: &Path) -> Workspace {
        let root = match &self.workspace.root {
            Some(root) => path::absolutize(root, project_dir),
            None => path::normalize_lexically(project_dir),
        };
        let name = self
            .workspace
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                root.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "workspace".to_string());

        let mut workspace = Workspace::new(name, root);
        for target in &self.targets {
            workspace.add_target(target.to_target());
        }
        for package in &self.packages {
            workspace.add_package(package.to_package(self.settings.fast_check_on_save));
        }
        workspace
    }

    /// Consume the configuration into its workspace.
    pub fn into_workspace(self, project_dir: &Path) -> Workspace {
        self.to_workspace(project_dir)
    }
}
