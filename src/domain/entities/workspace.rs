//! Workspace entity - a root directory with its targets and packages

use std::path::{Path, PathBuf};

use super::{Package, Target};
use crate::domain::value_objects::path;

/// A loaded workspace. Owns its targets and packages.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub name: String,
    /// Absolute, normalized root directory
    pub root: PathBuf,
    targets: Vec<Target>,
    packages: Vec<Package>,
}

impl Workspace {
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            root: path::normalize_lexically(root.as_ref()),
            targets: Vec::new(),
            packages: Vec::new(),
        }
    }

    /// Add a target, stamping its declaration index and owning workspace.
    pub fn add_target(&mut self, target: Target) {
        let index = self.targets.len();
        let target = target
            .with_index(index)
            .in_workspace(self.name.clone(), self.root.clone());
        self.targets.push(target);
    }

    pub fn add_package(&mut self, mut package: Package) {
        package.index = self.packages.len();
        self.packages.push(package);
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.add_target(target);
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.add_package(package);
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Find a target by name (case-insensitive)
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.has_name(name))
    }

    /// Resolve target names, skipping unknown ones.
    ///
    /// Each target appears once; the result is in declaration order.
    pub fn targets_by_name<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Target> {
        let mut found: Vec<&Target> = names
            .iter()
            .filter_map(|name| self.target(name.as_ref()))
            .collect();
        found.sort_by_key(|t| t.index);
        found.dedup_by_key(|t| t.index);
        found
    }

    /// Check whether a file lives inside this workspace
    pub fn is_path_of(&self, file: &Path) -> bool {
        path::is_path_of(&self.root, &self.absolute(file))
    }

    /// Workspace-relative filter path (`/src/app.js`) of a file
    pub fn relative_path(&self, file: &Path) -> Option<String> {
        path::relative_filter_path(&self.root, &self.absolute(file))
    }

    /// Make a possibly relative path absolute against the root
    pub fn absolute(&self, file: &Path) -> PathBuf {
        path::absolutize(file, &self.root)
    }
}

/// Pick the workspace whose root contains `file`, preferring the longest root.
pub fn select_workspace<'w>(workspaces: &'w [Workspace], file: &Path) -> Option<&'w Workspace> {
    workspaces
        .iter()
        .filter(|ws| file.is_absolute() && ws.is_path_of(file))
        .max_by_key(|ws| ws.root.components().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Workspace {
        Workspace::new("site", "/work/site")
            .with_target(Target::new("Prod", "local"))
            .with_target(Target::new("staging", "local"))
            .with_target(Target::new("styles", "compiler"))
    }

    #[test]
    fn targets_get_index_and_owner() {
        let ws = sample();
        let styles = ws.target("styles").unwrap();
        assert_eq!(styles.index, 2);
        assert_eq!(styles.workspace_name, "site");
        assert_eq!(styles.workspace_root, PathBuf::from("/work/site"));
    }

    #[test]
    fn targets_by_name_is_ordered_and_unique() {
        let ws = sample();
        let found = ws.targets_by_name(&["styles", "prod", "PROD", "missing"]);
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Prod", "styles"]);
    }

    #[test]
    fn relative_paths() {
        let ws = sample();
        assert_eq!(
            ws.relative_path(Path::new("/work/site/css/a.css")),
            Some("/css/a.css".to_string())
        );
        assert_eq!(
            ws.relative_path(Path::new("css/a.css")),
            Some("/css/a.css".to_string())
        );
        assert!(ws.relative_path(Path::new("/elsewhere/a.css")).is_none());
    }

    #[test]
    fn most_specific_workspace_wins() {
        let workspaces = vec![
            Workspace::new("outer", "/work"),
            Workspace::new("inner", "/work/site"),
            Workspace::new("other", "/srv"),
        ];
        let ws = select_workspace(&workspaces, Path::new("/work/site/index.html")).unwrap();
        assert_eq!(ws.name, "inner");

        let ws = select_workspace(&workspaces, Path::new("/work/notes.md")).unwrap();
        assert_eq!(ws.name, "outer");

        assert!(select_workspace(&workspaces, Path::new("/tmp/x")).is_none());
    }
}
