use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use targetsync::application::Session;
use targetsync::config::{load_for_project, Config, LoadedConfig, PROJECT_CONFIG};
use targetsync::domain::value_objects::path::absolutize;
use targetsync::presentation::factory::session_for_project;

use crate::cli::Cli;

/// Discover the project directory from an invocation directory.
///
/// Heuristics (first match wins, walking upward from `start`):
/// - `.targetsync/config.toml` (project configuration)
/// - `.git/` or `.git` file (git repo root / worktree)
///
/// Falls back to `start` when no markers are found.
pub(crate) fn discover_project_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join(PROJECT_CONFIG).is_file() {
            return dir.to_path_buf();
        }
    }
    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}

/// A loaded project: its directory, configuration and session
pub(crate) struct Project {
    pub dir: PathBuf,
    pub loaded: LoadedConfig,
    pub session: Session,
}

impl Project {
    pub fn config(&self) -> &Config {
        &self.loaded.config
    }

    /// Make command-line paths absolute against the current directory
    pub fn absolute_files(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        Ok(files
            .iter()
            .map(|file| absolutize(file, &cwd))
            .collect())
    }
}

pub(crate) fn open_project(cli: &Cli) -> Result<Project> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let dir = match &cli.root {
        Some(root) => absolutize(root, &cwd),
        None => discover_project_root(&cwd),
    };

    let loaded = load_for_project(&dir, cli.config.as_deref())
        .with_context(|| format!("failed to load configuration for {}", dir.display()))?;
    let session = session_for_project(&loaded.config, &dir);

    Ok(Project {
        dir,
        loaded,
        session,
    })
}
