//! Plugin Port
//!
//! A plugin implements the batch operations for one target type. The
//! controller builds fresh file handles for every call; plugins drive each
//! handle's lifecycle and return an aggregate report for the batch.

use crate::domain::entities::{FileToDelete, FileToDownload, FileToUpload, Target};
use crate::domain::value_objects::{
    CancellationFlag, CompileResult, CompileResultMessage, DirectoryListing, OperationKind,
};
use crate::error::{SyncError, SyncResult};

/// Which batch operations a plugin supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    pub can_upload: bool,
    pub can_download: bool,
    pub can_delete: bool,
    pub can_list: bool,
}

impl PluginCapabilities {
    /// Every operation supported
    pub fn all() -> Self {
        Self {
            can_upload: true,
            can_download: true,
            can_delete: true,
            can_list: true,
        }
    }

    pub fn supports(&self, operation: OperationKind) -> bool {
        match operation {
            OperationKind::Upload => self.can_upload,
            OperationKind::Download => self.can_download,
            OperationKind::Delete => self.can_delete,
            OperationKind::List => self.can_list,
        }
    }
}

/// Context of an upload batch
pub struct UploadContext<'a> {
    pub target: &'a Target,
    pub files: &'a [FileToUpload],
    pub cancel: &'a CancellationFlag,
}

/// Context of a download batch
pub struct DownloadContext<'a> {
    pub target: &'a Target,
    pub files: &'a [FileToDownload],
    pub cancel: &'a CancellationFlag,
}

/// Context of a delete batch
pub struct DeleteContext<'a> {
    pub target: &'a Target,
    pub files: &'a [FileToDelete],
    pub cancel: &'a CancellationFlag,
}

/// Context of a directory listing
pub struct ListContext<'a> {
    pub target: &'a Target,
    /// Directory relative to the target root (`/`, `/css`, ...)
    pub dir: &'a str,
    pub cancel: &'a CancellationFlag,
}

/// Aggregate result of one batch, inspected after every file completed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub messages: Vec<CompileResultMessage>,
}

impl BatchReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The first error-category message, if any
    pub fn first_error(&self) -> Option<&CompileResultMessage> {
        self.messages.iter().find(|m| m.is_error())
    }
}

impl From<CompileResult> for BatchReport {
    fn from(result: CompileResult) -> Self {
        Self {
            messages: result.messages,
        }
    }
}

/// Handler for one target type.
///
/// Operations a plugin does not support keep the default implementation,
/// which fails with [`SyncError::CapabilityMissing`].
pub trait Plugin: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn capabilities(&self) -> PluginCapabilities;

    fn upload_files(&self, context: &UploadContext<'_>) -> SyncResult<BatchReport> {
        Err(missing(context.target, OperationKind::Upload))
    }

    fn download_files(&self, context: &DownloadContext<'_>) -> SyncResult<BatchReport> {
        Err(missing(context.target, OperationKind::Download))
    }

    fn delete_files(&self, context: &DeleteContext<'_>) -> SyncResult<BatchReport> {
        Err(missing(context.target, OperationKind::Delete))
    }

    fn list_directory(&self, context: &ListContext<'_>) -> SyncResult<DirectoryListing> {
        Err(missing(context.target, OperationKind::List))
    }
}

fn missing(target: &Target, operation: OperationKind) -> SyncError {
    SyncError::CapabilityMissing {
        target: target.name.clone(),
        operation,
    }
}
