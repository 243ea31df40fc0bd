//! Per-file operation handles handed to plugins
//!
//! A handle is created right before a plugin call and dropped once its
//! completion callback ran. Every handle walks the same lifecycle:
//! `Pending -> Started -> Succeeded | Failed`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::domain::ports::{FileSystem, OperationEvent, OperationEventSink};
use crate::domain::value_objects::OperationKind;
use crate::error::{SyncError, SyncResult};

/// Where a file is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Pending,
    Started,
    Succeeded,
    Failed(String),
}

impl FileOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, FileOutcome::Succeeded | FileOutcome::Failed(_))
    }
}

/// Shared state for every handle of one batch
#[derive(Clone)]
pub struct BatchScope {
    target: String,
    fs: Arc<dyn FileSystem>,
    events: Arc<dyn OperationEventSink>,
}

impl BatchScope {
    pub fn new(
        target: impl Into<String>,
        fs: Arc<dyn FileSystem>,
        events: Arc<dyn OperationEventSink>,
    ) -> Self {
        Self {
            target: target.into(),
            fs,
            events,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn events(&self) -> &Arc<dyn OperationEventSink> {
        &self.events
    }

    pub fn upload(&self, index: usize, path: PathBuf, relative: String) -> FileToUpload {
        FileToUpload {
            core: self.core(OperationKind::Upload, index, path, relative),
        }
    }

    pub fn download(&self, index: usize, path: PathBuf, relative: String) -> FileToDownload {
        FileToDownload {
            core: self.core(OperationKind::Download, index, path, relative),
        }
    }

    pub fn delete(&self, index: usize, path: PathBuf, relative: String) -> FileToDelete {
        FileToDelete {
            core: self.core(OperationKind::Delete, index, path, relative),
        }
    }

    fn core(
        &self,
        operation: OperationKind,
        index: usize,
        path: PathBuf,
        relative: String,
    ) -> HandleCore {
        HandleCore {
            operation,
            index,
            path,
            relative,
            scope: self.clone(),
            outcome: Mutex::new(FileOutcome::Pending),
        }
    }
}

struct HandleCore {
    operation: OperationKind,
    index: usize,
    /// Absolute local path
    path: PathBuf,
    /// Workspace-relative `/`-prefixed path
    relative: String,
    scope: BatchScope,
    outcome: Mutex<FileOutcome>,
}

impl HandleCore {
    fn outcome_guard(&self) -> MutexGuard<'_, FileOutcome> {
        self.outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.relative.as_str())
    }

    fn begin(&self, destination: Option<&str>) -> SyncResult<()> {
        {
            let mut outcome = self.outcome_guard();
            if *outcome != FileOutcome::Pending {
                return Err(SyncError::file_operation(
                    self.operation,
                    &self.path,
                    "file operation already started",
                ));
            }
            *outcome = FileOutcome::Started;
        }

        self.scope.events.on_event(OperationEvent::FileStarted {
            operation: self.operation,
            target: self.scope.target.clone(),
            index: self.index,
            path: self.path.clone(),
            destination: destination.map(str::to_string),
        });
        Ok(())
    }

    fn complete(&self, error: Option<&SyncError>) {
        {
            let mut outcome = self.outcome_guard();
            if outcome.is_finished() {
                debug!(path = %self.path.display(), "ignoring repeated completion");
                return;
            }
            *outcome = match error {
                Some(e) => FileOutcome::Failed(e.to_string()),
                None => FileOutcome::Succeeded,
            };
        }

        let event = match error {
            Some(e) => OperationEvent::FileFailed {
                operation: self.operation,
                target: self.scope.target.clone(),
                index: self.index,
                path: self.path.clone(),
                error: e.to_string(),
            },
            None => OperationEvent::FileCompleted {
                operation: self.operation,
                target: self.scope.target.clone(),
                index: self.index,
                path: self.path.clone(),
            },
        };
        self.scope.events.on_event(event);
    }
}

macro_rules! handle_accessors {
    ($handle:ty) => {
        impl $handle {
            /// Position inside the batch
            pub fn index(&self) -> usize {
                self.core.index
            }

            /// Absolute local path
            pub fn path(&self) -> &Path {
                &self.core.path
            }

            /// Workspace-relative path (`/dir/file.ext`)
            pub fn relative_path(&self) -> &str {
                &self.core.relative
            }

            /// File name without directories
            pub fn name(&self) -> &str {
                self.core.name()
            }

            pub fn target_name(&self) -> &str {
                &self.core.scope.target
            }

            pub fn outcome(&self) -> FileOutcome {
                self.core.outcome_guard().clone()
            }
        }

        impl std::fmt::Debug for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("index", &self.core.index)
                    .field("path", &self.core.path)
                    .field("outcome", &self.outcome())
                    .finish()
            }
        }
    };
}

/// A local file to send to a target
pub struct FileToUpload {
    core: HandleCore,
}

handle_accessors!(FileToUpload);

impl FileToUpload {
    /// Mark the upload as started. `destination` is a hint for where the
    /// plugin will put the file.
    pub fn on_before_upload(&self, destination: Option<&str>) -> SyncResult<()> {
        self.core.begin(destination)
    }

    pub fn on_upload_completed(&self, error: Option<&SyncError>) {
        self.core.complete(error)
    }

    /// Read the local content. Nothing is loaded before this is called.
    pub fn read(&self) -> SyncResult<Vec<u8>> {
        self.core
            .scope
            .fs
            .read(&self.core.path)
            .map_err(|e| SyncError::file_operation(OperationKind::Upload, &self.core.path, e))
    }
}

/// A remote file to fetch into the workspace
pub struct FileToDownload {
    core: HandleCore,
}

handle_accessors!(FileToDownload);

impl FileToDownload {
    pub fn on_before_download(&self, source: Option<&str>) -> SyncResult<()> {
        self.core.begin(source)
    }

    /// Finish the download; a payload is written to the local path.
    pub fn on_download_completed(&self, result: Result<&[u8], &SyncError>) {
        match result {
            Ok(data) => match self.core.scope.fs.write(&self.core.path, data) {
                Ok(()) => self.core.complete(None),
                Err(e) => {
                    let err =
                        SyncError::file_operation(OperationKind::Download, &self.core.path, e);
                    self.core.complete(Some(&err));
                }
            },
            Err(err) => self.core.complete(Some(err)),
        }
    }
}

/// A file to remove from a target
pub struct FileToDelete {
    core: HandleCore,
}

handle_accessors!(FileToDelete);

impl FileToDelete {
    pub fn on_before_delete(&self, destination: Option<&str>) -> SyncResult<()> {
        self.core.begin(destination)
    }

    pub fn on_delete_completed(&self, error: Option<&SyncError>) {
        self.core.complete(error)
    }
}
