//! Source file collection for compile runs

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{trace, warn};

use crate::domain::value_objects::path::absolutize;
use crate::domain::value_objects::{relative_filter_path, CompiledFilter, FileFilter};
use crate::error::SyncResult;

/// Per-directory ignore file honored while walking a workspace
pub const IGNORE_FILE_NAME: &str = ".targetsyncignore";

/// Collect the files below `root` matching the include/exclude patterns.
///
/// With `only`, just those files are considered (outside paths are
/// dropped). Results are sorted so runs are deterministic.
pub fn collect_sources(
    root: &Path,
    include: &[String],
    exclude: &[String],
    only: Option<&[PathBuf]>,
) -> SyncResult<Vec<PathBuf>> {
    let filter = FileFilter::new(include.iter().cloned(), exclude.iter().cloned()).compile()?;

    let mut sources = match only {
        Some(files) => files
            .iter()
            .map(|file| absolutize(file, root))
            .filter(|file| accepts(&filter, root, file))
            .collect(),
        None => walk(root, &filter),
    };
    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn walk(root: &Path, filter: &CompiledFilter) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && accepts(filter, root, entry.path()) {
            found.push(entry.path().to_path_buf());
        }
    }
    found
}

fn accepts(filter: &CompiledFilter, root: &Path, file: &Path) -> bool {
    match relative_filter_path(root, file) {
        Some(relative) => {
            let matched = filter.matches(&relative);
            trace!(file = %relative, matched, "source candidate");
            matched
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn walks_with_include_and_exclude() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "js/app.js");
        touch(dir.path(), "js/app.min.js");
        touch(dir.path(), ".hidden/tool.js");
        touch(dir.path(), "css/site.css");

        let found = collect_sources(
            dir.path(),
            &patterns(&["**/*.js"]),
            &patterns(&["**/*.min.js"]),
            None,
        )
        .unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| relative_filter_path(dir.path(), p).unwrap())
            .collect();
        assert_eq!(names, vec!["/.hidden/tool.js", "/js/app.js"]);
    }

    #[test]
    fn ignore_file_is_honored() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "vendor/lib.less");
        touch(dir.path(), "site.less");
        fs::write(dir.path().join(IGNORE_FILE_NAME), "vendor/\n").unwrap();

        let found = collect_sources(dir.path(), &patterns(&["**/*.less"]), &[], None).unwrap();
        assert_eq!(found, vec![dir.path().join("site.less")]);
    }

    #[test]
    fn only_restricts_candidates() {
        let dir = tempdir().unwrap();
        let only = vec![
            PathBuf::from("a.less"),
            dir.path().join("b.css"),
            PathBuf::from("/elsewhere/c.less"),
        ];
        let found =
            collect_sources(dir.path(), &patterns(&["**/*.less"]), &[], Some(&only)).unwrap();
        assert_eq!(found, vec![dir.path().join("a.less")]);
    }
}
