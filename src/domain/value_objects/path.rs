//! Path containment helpers
//!
//! Every path derived from user input (a requested listing directory, a file
//! mirrored into an output root) is resolved lexically and checked to stay
//! below its root before the file system is touched:
//! - `..` and `.` components are collapsed without following symlinks
//! - the result must still be prefixed by the root

use std::path::{Component, Path, PathBuf};

use crate::error::{SyncError, SyncResult};

/// Collapse `.` and `..` components without touching the file system.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    result.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_root && result.has_root() {
                    continue;
                }
                if matches!(result.components().next_back(), Some(Component::Normal(_))) {
                    result.pop();
                } else {
                    result.push("..");
                }
            }
            Component::Normal(part) => result.push(part),
        }
    }
    result
}

/// Make a path absolute against `base` and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Resolve `requested` (relative, `/`-prefixed relative, or empty) below `root`.
///
/// Fails with [`SyncError::PathEscape`] when the resolved path is not
/// prefixed by the root.
pub fn resolve_within(root: &Path, requested: &str) -> SyncResult<PathBuf> {
    let root = normalize_lexically(root);
    let relative = requested
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_string();

    let resolved = normalize_lexically(&root.join(&relative));
    if !resolved.starts_with(&root) {
        return Err(SyncError::PathEscape {
            path: resolved,
            root,
        });
    }
    Ok(resolved)
}

/// Check whether `path` lies inside (or is) `root`, comparing normalized forms.
pub fn is_path_of(root: &Path, path: &Path) -> bool {
    normalize_lexically(path).starts_with(normalize_lexically(root))
}

/// Workspace-relative form used by filters: forward slashes, leading `/`.
///
/// Returns `None` when `path` is outside `root`.
pub fn relative_filter_path(root: &Path, path: &Path) -> Option<String> {
    let root = normalize_lexically(root);
    let path = normalize_lexically(path);
    let relative = path.strip_prefix(&root).ok()?;

    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("/{}", joined))
}
