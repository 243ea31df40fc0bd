//! Target entity - a configured destination that file operations go to

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{path, FileFilter};

/// One hook step run before or after a deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TargetOperation {
    /// Run an external command from the workspace root
    Exec {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Emit a log line
    Log { message: String },
}

impl TargetOperation {
    /// Short label for events and errors
    pub fn label(&self) -> String {
        match self {
            TargetOperation::Exec { command, args } if args.is_empty() => command.clone(),
            TargetOperation::Exec { command, args } => format!("{} {}", command, args.join(" ")),
            TargetOperation::Log { message } => format!("log: {}", message),
        }
    }
}

/// Settings specific to `compiler` targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Compiler key (`less`, `pug`, `coffee`, ...)
    pub compiler: String,
    /// Source patterns overriding the compiler default
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Output text encoding label, `utf-8` when unset
    #[serde(default)]
    pub encoding: Option<String>,
    /// Output extension overriding the compiler default
    #[serde(default)]
    pub extension: Option<String>,
    /// Executable overriding the compiler's default tool
    #[serde(default)]
    pub tool: Option<String>,
    /// Passthrough options handed to the tool
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// A named destination.
///
/// Built once from configuration when the workspace loads and immutable
/// afterwards; `index` is its declaration order and drives result ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub name: String,
    /// Lower-cased type key selecting the plugin
    pub kind: String,
    pub description: Option<String>,
    /// Ordered file mappings; the target applies when any of them matches
    pub filters: Vec<FileFilter>,
    /// Conditions that must all hold for the target to be active
    pub conditions: Vec<String>,
    pub platforms: Vec<String>,
    /// Destination directory for directory-backed plugins
    pub dir: Option<String>,
    pub compiler: Option<CompilerSettings>,
    pub before_deploy: Vec<TargetOperation>,
    pub deployed: Vec<TargetOperation>,
    pub index: usize,
    pub workspace_name: String,
    pub workspace_root: PathBuf,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into().trim().to_lowercase(),
            description: None,
            filters: Vec::new(),
            conditions: Vec::new(),
            platforms: Vec::new(),
            dir: None,
            compiler: None,
            before_deploy: Vec::new(),
            deployed: Vec::new(),
            index: 0,
            workspace_name: String::new(),
            workspace_root: PathBuf::new(),
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_compiler(mut self, settings: CompilerSettings) -> Self {
        self.compiler = Some(settings);
        self
    }

    pub fn with_hooks(
        mut self,
        before_deploy: Vec<TargetOperation>,
        deployed: Vec<TargetOperation>,
    ) -> Self {
        self.before_deploy = before_deploy;
        self.deployed = deployed;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Attach the owning workspace
    pub fn in_workspace(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.workspace_name = name.into();
        self.workspace_root = root.into();
        self
    }

    /// Display name (description when given)
    pub fn display_name(&self) -> &str {
        match &self.description {
            Some(description) if !description.trim().is_empty() => description,
            _ => &self.name,
        }
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    /// `dir` resolved against the workspace root, falling back to the root.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => path::absolutize(Path::new(dir), &self.workspace_root),
            _ => path::normalize_lexically(&self.workspace_root),
        }
    }

    /// Check the file mappings against a workspace-relative path.
    ///
    /// A target without mappings accepts every path.
    pub fn matches_path(&self, relative: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        self.filters.iter().any(|filter| filter.matches(relative))
    }
}
