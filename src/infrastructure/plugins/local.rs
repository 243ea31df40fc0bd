//! `local` plugin - mirrors workspace files into a directory

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::entities::Target;
use crate::domain::ports::{
    BatchReport, DeleteContext, DownloadContext, FileSystem, ListContext, Plugin,
    PluginCapabilities, UploadContext,
};
use crate::domain::services::{drive_deletes, drive_downloads, drive_uploads};
use crate::domain::value_objects::{resolve_within, DirectoryListing, OperationKind};
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::fs::list_directory_within;

/// Copies files between the workspace and the target's `dir`
pub struct LocalPlugin {
    fs: Arc<dyn FileSystem>,
}

impl LocalPlugin {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

/// Where a workspace-relative path lives inside the target directory
fn destination(target: &Target, relative: &str) -> SyncResult<PathBuf> {
    resolve_within(&target.resolved_dir(), relative)
}

fn hint(target: &Target, relative: &str) -> Option<String> {
    destination(target, relative)
        .ok()
        .and_then(|p| p.parent().map(|d| d.display().to_string()))
}

impl Plugin for LocalPlugin {
    fn name(&self) -> &str {
        "local"
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::all()
    }

    fn upload_files(&self, context: &UploadContext<'_>) -> SyncResult<BatchReport> {
        let target = context.target;
        drive_uploads(
            context.files,
            context.cancel,
            |file| hint(target, file.relative_path()),
            |file, data| {
                let dest = destination(target, file.relative_path())?;
                if dest == file.path() {
                    return Err(SyncError::file_operation(
                        OperationKind::Upload,
                        file.path(),
                        "destination is the source file",
                    ));
                }
                self.fs
                    .write(&dest, &data)
                    .map_err(|e| SyncError::file_operation(OperationKind::Upload, &dest, e))
            },
        );
        Ok(BatchReport::empty())
    }

    fn download_files(&self, context: &DownloadContext<'_>) -> SyncResult<BatchReport> {
        let target = context.target;
        drive_downloads(
            context.files,
            context.cancel,
            |file| hint(target, file.relative_path()),
            |file| {
                let source = destination(target, file.relative_path())?;
                self.fs
                    .read(&source)
                    .map_err(|e| SyncError::file_operation(OperationKind::Download, &source, e))
            },
        );
        Ok(BatchReport::empty())
    }

    fn delete_files(&self, context: &DeleteContext<'_>) -> SyncResult<BatchReport> {
        let target = context.target;
        drive_deletes(
            context.files,
            context.cancel,
            |file| hint(target, file.relative_path()),
            |file| {
                let dest = destination(target, file.relative_path())?;
                self.fs
                    .remove(&dest)
                    .map_err(|e| SyncError::file_operation(OperationKind::Delete, &dest, e))
            },
        );
        Ok(BatchReport::empty())
    }

    fn list_directory(&self, context: &ListContext<'_>) -> SyncResult<DirectoryListing> {
        list_directory_within(&context.target.resolved_dir(), context.dir, context.cancel)
    }
}
