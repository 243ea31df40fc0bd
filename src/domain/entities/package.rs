//! Package entity - a named group of files and the targets it deploys to

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::value_objects::FileFilter;

/// Which targets a package deploys to when one of its files is saved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum TargetSelection {
    /// Deploy on save is off
    #[default]
    Disabled,
    /// Every target the package lists
    All,
    /// Explicit target names
    Named(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetSelectionDe {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for TargetSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match TargetSelectionDe::deserialize(deserializer)? {
            TargetSelectionDe::Flag(true) => TargetSelection::All,
            TargetSelectionDe::Flag(false) => TargetSelection::Disabled,
            TargetSelectionDe::One(name) if name.trim().is_empty() => TargetSelection::Disabled,
            TargetSelectionDe::One(name) => TargetSelection::Named(vec![name]),
            TargetSelectionDe::Many(names) => TargetSelection::Named(names),
        })
    }
}

/// Named grouping of file rules and target associations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Package {
    pub name: String,
    pub description: Option<String>,
    pub filter: FileFilter,
    pub conditions: Vec<String>,
    pub platforms: Vec<String>,
    /// Targets the package deploys to by default
    pub targets: Vec<String>,
    pub deploy_on_save: TargetSelection,
    /// Use path containment and patterns only when resolving on save
    pub fast_check_on_save: bool,
    pub index: usize,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deploy_on_save(mut self, selection: TargetSelection) -> Self {
        self.deploy_on_save = selection;
        self
    }

    pub fn with_fast_check(mut self, fast: bool) -> Self {
        self.fast_check_on_save = fast;
        self
    }

    /// Target names deployed on save, `None` when deploy on save is off.
    pub fn save_target_names(&self) -> Option<Vec<String>> {
        match &self.deploy_on_save {
            TargetSelection::Disabled => None,
            TargetSelection::All => Some(self.targets.clone()),
            TargetSelection::Named(names) => Some(names.clone()),
        }
    }
}
