//! Operation controller
//!
//! Turns "run this operation for these files on this target" into plugin
//! calls. Every plugin gets its own freshly built file handles; a file
//! counts once in the summary, failed if any plugin failed it and
//! succeeded only if every plugin finished it. Per-file failures stay in
//! the handles; the batch fails only on precondition errors or when the
//! aggregate report carries an error entry. A precondition error from one
//! plugin stops the plugins after it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::plugin_registry::PluginRegistry;
use crate::domain::entities::{BatchScope, FileOutcome, Target};
use crate::domain::ports::{
    BatchReport, DeleteContext, DownloadContext, FileSystem, ListContext, OperationEvent,
    OperationEventSink, Plugin, UploadContext,
};
use crate::domain::value_objects::file_filter::to_filter_path;
use crate::domain::value_objects::path::absolutize;
use crate::domain::value_objects::{
    relative_filter_path, CancellationFlag, DirectoryListing, OperationKind,
};
use crate::error::{SyncError, SyncResult};

/// Outcome of one batch on one target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub target: String,
    pub succeeded: usize,
    pub failed: usize,
    /// Files never started because the batch was cancelled
    pub skipped: usize,
    /// Failure message per failed file
    pub errors: Vec<(PathBuf, String)>,
    pub report: BatchReport,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn absorb(&mut self, outcomes: impl IntoIterator<Item = (PathBuf, FileOutcome)>) {
        for (path, outcome) in outcomes {
            match outcome {
                FileOutcome::Succeeded => self.succeeded += 1,
                FileOutcome::Failed(message) => {
                    self.failed += 1;
                    self.errors.push((path, message));
                }
                FileOutcome::Pending | FileOutcome::Started => self.skipped += 1,
            }
        }
    }
}

/// Per-file outcomes of one batch, combined across plugins
#[derive(Debug, Default)]
struct MergedOutcomes {
    files: Option<Vec<(PathBuf, FileOutcome)>>,
}

impl MergedOutcomes {
    fn merge(&mut self, outcomes: Vec<(PathBuf, FileOutcome)>) {
        let Some(files) = self.files.as_mut() else {
            self.files = Some(outcomes);
            return;
        };
        for ((_, merged), (_, outcome)) in files.iter_mut().zip(outcomes) {
            // Ties keep the earlier plugin's outcome and message.
            if severity(&outcome) > severity(merged) {
                *merged = outcome;
            }
        }
    }

    fn into_outcomes(self) -> Vec<(PathBuf, FileOutcome)> {
        self.files.unwrap_or_default()
    }
}

fn severity(outcome: &FileOutcome) -> u8 {
    match outcome {
        FileOutcome::Succeeded => 0,
        FileOutcome::Pending | FileOutcome::Started => 1,
        FileOutcome::Failed(_) => 2,
    }
}

/// Dispatches batches to the plugins registered for a target's type
pub struct OperationController {
    registry: PluginRegistry,
    fs: Arc<dyn FileSystem>,
    events: Arc<dyn OperationEventSink>,
}

impl OperationController {
    pub fn new(
        registry: PluginRegistry,
        fs: Arc<dyn FileSystem>,
        events: Arc<dyn OperationEventSink>,
    ) -> Self {
        Self {
            registry,
            fs,
            events,
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn events(&self) -> &Arc<dyn OperationEventSink> {
        &self.events
    }

    /// Upload local files to a target
    pub fn upload(
        &self,
        target: &Target,
        files: &[PathBuf],
        cancel: &CancellationFlag,
    ) -> SyncResult<BatchSummary> {
        self.run_batch(OperationKind::Upload, target, files, |plugin, scope| {
            let handles: Vec<_> = requests(target, files)
                .map(|(i, path, rel)| scope.upload(i, path, rel))
                .collect();
            let report = plugin.upload_files(&UploadContext {
                target,
                files: &handles,
                cancel,
            })?;
            let outcomes = handles
                .iter()
                .map(|h| (h.path().to_path_buf(), h.outcome()))
                .collect();
            Ok((report, outcomes))
        })
    }

    /// Fetch files from a target into the workspace
    pub fn download(
        &self,
        target: &Target,
        files: &[PathBuf],
        cancel: &CancellationFlag,
    ) -> SyncResult<BatchSummary> {
        self.run_batch(OperationKind::Download, target, files, |plugin, scope| {
            let handles: Vec<_> = requests(target, files)
                .map(|(i, path, rel)| scope.download(i, path, rel))
                .collect();
            let report = plugin.download_files(&DownloadContext {
                target,
                files: &handles,
                cancel,
            })?;
            let outcomes = handles
                .iter()
                .map(|h| (h.path().to_path_buf(), h.outcome()))
                .collect();
            Ok((report, outcomes))
        })
    }

    /// Remove files from a target
    pub fn delete(
        &self,
        target: &Target,
        files: &[PathBuf],
        cancel: &CancellationFlag,
    ) -> SyncResult<BatchSummary> {
        self.run_batch(OperationKind::Delete, target, files, |plugin, scope| {
            let handles: Vec<_> = requests(target, files)
                .map(|(i, path, rel)| scope.delete(i, path, rel))
                .collect();
            let report = plugin.delete_files(&DeleteContext {
                target,
                files: &handles,
                cancel,
            })?;
            let outcomes = handles
                .iter()
                .map(|h| (h.path().to_path_buf(), h.outcome()))
                .collect();
            Ok((report, outcomes))
        })
    }

    /// List a directory of a target, using the first plugin able to list
    pub fn list(
        &self,
        target: &Target,
        dir: &str,
        cancel: &CancellationFlag,
    ) -> SyncResult<DirectoryListing> {
        let plugin = self
            .capable_plugins(target, OperationKind::List)?
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::CapabilityMissing {
                target: target.name.clone(),
                operation: OperationKind::List,
            })?;

        debug!(target = %target.name, plugin = plugin.name(), dir, "listing directory");
        plugin.list_directory(&ListContext {
            target,
            dir,
            cancel,
        })
    }

    fn capable_plugins(
        &self,
        target: &Target,
        operation: OperationKind,
    ) -> SyncResult<Vec<Arc<dyn Plugin>>> {
        let plugins = self.registry.plugins_for_target(target);
        if plugins.is_empty() {
            return Err(SyncError::UnsupportedTargetType {
                kind: target.kind.clone(),
                target: target.name.clone(),
            });
        }
        Ok(plugins
            .into_iter()
            .filter(|p| p.capabilities().supports(operation))
            .collect())
    }

    fn run_batch<F>(
        &self,
        operation: OperationKind,
        target: &Target,
        files: &[PathBuf],
        mut call: F,
    ) -> SyncResult<BatchSummary>
    where
        F: FnMut(
            &dyn Plugin,
            &BatchScope,
        ) -> SyncResult<(BatchReport, Vec<(PathBuf, FileOutcome)>)>,
    {
        let plugins = self.capable_plugins(target, operation)?;
        if plugins.is_empty() {
            return Err(SyncError::CapabilityMissing {
                target: target.name.clone(),
                operation,
            });
        }

        self.events.on_event(OperationEvent::BatchStarted {
            operation,
            target: target.name.clone(),
            file_count: files.len(),
        });

        let scope = BatchScope::new(target.name.clone(), self.fs.clone(), self.events.clone());
        let mut summary = BatchSummary {
            target: target.name.clone(),
            ..BatchSummary::default()
        };

        let mut merged = MergedOutcomes::default();
        let mut precondition = None;
        for plugin in &plugins {
            debug!(%operation, target = %target.name, plugin = plugin.name(), "dispatching batch");
            match call(plugin.as_ref(), &scope) {
                Ok((report, outcomes)) => {
                    summary.report.messages.extend(report.messages);
                    merged.merge(outcomes);
                }
                Err(e) => {
                    warn!(
                        %operation,
                        target = %target.name,
                        plugin = plugin.name(),
                        error = %e,
                        "plugin refused batch"
                    );
                    precondition = Some(e);
                    break;
                }
            }
        }
        summary.absorb(merged.into_outcomes());

        if summary.skipped > 0 {
            self.events.on_event(OperationEvent::BatchCancelled {
                operation,
                target: target.name.clone(),
                remaining: summary.skipped,
            });
        }
        self.events.on_event(OperationEvent::BatchFinished {
            operation,
            target: target.name.clone(),
            succeeded: summary.succeeded,
            failed: summary.failed,
        });
        info!(
            %operation,
            target = %target.name,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch finished"
        );

        if let Some(e) = precondition {
            return Err(e);
        }
        // Files completed individually; an error entry still fails the batch.
        if let Some(first) = summary.report.first_error() {
            return Err(SyncError::Aggregate {
                target: target.name.clone(),
                compiler: first.compiler.to_string(),
                file: first.file.clone(),
                message: first.message.clone(),
            });
        }
        Ok(summary)
    }
}

/// Batch position, absolute path and workspace-relative path per file
fn requests<'a>(
    target: &'a Target,
    files: &'a [PathBuf],
) -> impl Iterator<Item = (usize, PathBuf, String)> + 'a {
    files.iter().enumerate().map(move |(index, file)| {
        let absolute = absolutize(file, &target.workspace_root);
        let relative = relative_filter_path(&target.workspace_root, &absolute)
            .unwrap_or_else(|| to_filter_path(&file_name(&absolute)));
        (index, absolute, relative)
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
