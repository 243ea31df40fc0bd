//! Per-file lifecycle drivers used by plugins
//!
//! Each driver walks a batch in order, checks the cancellation flag before
//! every file and reports each file's failure through its completion
//! callback. Nothing a single file does can abort the rest of the batch.

use tracing::debug;

use crate::domain::entities::{FileToDelete, FileToDownload, FileToUpload};
use crate::domain::value_objects::{CancellationFlag, OperationKind};
use crate::error::{SyncError, SyncResult};

/// Run uploads. `destination` gives the hint passed to `on_before_upload`;
/// `transfer` receives the file and its content.
pub fn drive_uploads<D, T>(
    files: &[FileToUpload],
    cancel: &CancellationFlag,
    destination: D,
    mut transfer: T,
) where
    D: Fn(&FileToUpload) -> Option<String>,
    T: FnMut(&FileToUpload, Vec<u8>) -> SyncResult<()>,
{
    for (position, file) in files.iter().enumerate() {
        if stop_requested(cancel, OperationKind::Upload, files.len() - position) {
            break;
        }

        let hint = destination(file);
        let result = file
            .on_before_upload(hint.as_deref())
            .and_then(|()| file.read())
            .and_then(|data| transfer(file, data));

        match result {
            Ok(()) => file.on_upload_completed(None),
            Err(e) => {
                let err = per_file(e, OperationKind::Upload, file.path());
                file.on_upload_completed(Some(&err));
            }
        }
    }
}

/// Run downloads. `fetch` returns the remote payload, which the handle
/// writes into the workspace.
pub fn drive_downloads<D, F>(
    files: &[FileToDownload],
    cancel: &CancellationFlag,
    source: D,
    mut fetch: F,
) where
    D: Fn(&FileToDownload) -> Option<String>,
    F: FnMut(&FileToDownload) -> SyncResult<Vec<u8>>,
{
    for (position, file) in files.iter().enumerate() {
        if stop_requested(cancel, OperationKind::Download, files.len() - position) {
            break;
        }

        let hint = source(file);
        let result = file
            .on_before_download(hint.as_deref())
            .and_then(|()| fetch(file));

        match result {
            Ok(data) => file.on_download_completed(Ok(&data)),
            Err(e) => {
                let err = per_file(e, OperationKind::Download, file.path());
                file.on_download_completed(Err(&err));
            }
        }
    }
}

/// Run deletes.
pub fn drive_deletes<D, R>(
    files: &[FileToDelete],
    cancel: &CancellationFlag,
    destination: D,
    mut remove: R,
) where
    D: Fn(&FileToDelete) -> Option<String>,
    R: FnMut(&FileToDelete) -> SyncResult<()>,
{
    for (position, file) in files.iter().enumerate() {
        if stop_requested(cancel, OperationKind::Delete, files.len() - position) {
            break;
        }

        let hint = destination(file);
        let result = file
            .on_before_delete(hint.as_deref())
            .and_then(|()| remove(file));

        match result {
            Ok(()) => file.on_delete_completed(None),
            Err(e) => {
                let err = per_file(e, OperationKind::Delete, file.path());
                file.on_delete_completed(Some(&err));
            }
        }
    }
}

fn stop_requested(cancel: &CancellationFlag, operation: OperationKind, remaining: usize) -> bool {
    if cancel.is_cancelling() {
        debug!(%operation, remaining, "batch cancelled");
        return true;
    }
    false
}

fn per_file(error: SyncError, operation: OperationKind, path: &std::path::Path) -> SyncError {
    if error.is_per_file() {
        error
    } else {
        SyncError::file_operation(operation, path, error)
    }
}
