//! Directory listing below a containment root
//!
//! Used by directory-backed plugins. The requested directory is resolved
//! and checked against the root before the file system is touched.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::value_objects::{
    relative_filter_path, resolve_within, CancellationFlag, DirectoryEntry, DirectoryListing,
    EntryKind, OperationKind,
};
use crate::error::{SyncError, SyncResult};

/// List `requested` (relative to `root`).
///
/// Entry kinds come from `symlink_metadata`, so a symlink is `Other` even
/// when it points at a file. File entries carry a lazy reader.
pub fn list_directory_within(
    root: &Path,
    requested: &str,
    cancel: &CancellationFlag,
) -> SyncResult<DirectoryListing> {
    let dir = resolve_within(root, requested)?;
    debug!(dir = %dir.display(), "listing directory");

    let mut entries = Vec::new();
    for item in fs::read_dir(&dir)? {
        if cancel.is_cancelling() {
            return Err(SyncError::Cancelled);
        }
        let item = item?;
        let path = item.path();
        let metadata = fs::symlink_metadata(&path)?;
        let file_type = metadata.file_type();

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let name = item.file_name().to_string_lossy().into_owned();
        let relative = relative_filter_path(root, &path)
            .unwrap_or_else(|| format!("/{}", name));
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        let mut entry = DirectoryEntry::new(name, relative, kind)
            .with_size(metadata.len())
            .with_modified(modified);
        if kind == EntryKind::File {
            let source = path.clone();
            entry = entry.with_reader(move || {
                fs::read(&source)
                    .map_err(|e| SyncError::file_operation(OperationKind::Download, &source, e))
            });
        }
        entries.push(entry);
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(DirectoryListing {
        dir: relative_filter_path(root, &dir)
            .unwrap_or_else(|| "/".to_string()),
        entries,
    })
}
