//! `compiler` plugin - compiles uploaded sources into the target directory

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{
    BatchReport, FileSystem, ListContext, Plugin, PluginCapabilities, ToolRunner, UploadContext,
};
use crate::domain::services::drive_uploads;
use crate::domain::value_objects::{DirectoryListing, FileFilter};
use crate::error::SyncResult;
use crate::infrastructure::compiler::{create_compiler_context, PreparedCompile};
use crate::infrastructure::fs::list_directory_within;

/// Routes "upload" through the compiler backends instead of a transport.
///
/// A file whose compile fails still completes; the error entry lands in
/// the batch report and fails the batch as a whole.
pub struct CompilerPlugin {
    runner: Arc<dyn ToolRunner>,
    fs: Arc<dyn FileSystem>,
}

impl CompilerPlugin {
    pub fn new(runner: Arc<dyn ToolRunner>, fs: Arc<dyn FileSystem>) -> Self {
        Self { runner, fs }
    }
}

impl Plugin for CompilerPlugin {
    fn name(&self) -> &str {
        "compiler"
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities {
            can_upload: true,
            can_list: true,
            ..PluginCapabilities::default()
        }
    }

    fn upload_files(&self, context: &UploadContext<'_>) -> SyncResult<BatchReport> {
        let compiler_context = create_compiler_context(context.target)?;
        let prepared = PreparedCompile::new(compiler_context.compiler, &compiler_context.options)?;
        let (include, exclude) = prepared.patterns();
        let filter = FileFilter::new(include, exclude).compile()?;

        let mut report = BatchReport::empty();
        drive_uploads(
            context.files,
            context.cancel,
            |file| Some(prepared.output_path(file.path()).display().to_string()),
            |file, data| {
                if !filter.matches(file.relative_path()) {
                    debug!(file = file.relative_path(), "not a source of this compiler");
                    return Ok(());
                }
                let result =
                    prepared.compile_source(file.path(), data, self.runner.as_ref(), self.fs.as_ref());
                report.messages.extend(result.messages);
                Ok(())
            },
        );
        Ok(report)
    }

    fn list_directory(&self, context: &ListContext<'_>) -> SyncResult<DirectoryListing> {
        let compiler_context = create_compiler_context(context.target)?;
        list_directory_within(&compiler_context.out_dir, context.dir, context.cancel)
    }
}
