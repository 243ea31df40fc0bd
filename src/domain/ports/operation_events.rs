//! Operation Event Port
//!
//! Observable interface for batch operations. Enables progress reporting,
//! logging and test assertions on the per-file lifecycle.

use std::path::PathBuf;

use crate::domain::value_objects::OperationKind;

/// Event emitted while a batch runs
#[derive(Debug, Clone, PartialEq)]
pub enum OperationEvent {
    /// A batch is about to process its files
    BatchStarted {
        operation: OperationKind,
        target: String,
        file_count: usize,
    },

    /// `onBefore*` was called for a file
    FileStarted {
        operation: OperationKind,
        target: String,
        index: usize,
        path: PathBuf,
        destination: Option<String>,
    },

    /// A file finished successfully
    FileCompleted {
        operation: OperationKind,
        target: String,
        index: usize,
        path: PathBuf,
    },

    /// A file failed; the batch goes on
    FileFailed {
        operation: OperationKind,
        target: String,
        index: usize,
        path: PathBuf,
        error: String,
    },

    /// Cancellation was observed before the remaining files started
    BatchCancelled {
        operation: OperationKind,
        target: String,
        remaining: usize,
    },

    /// Batch finished (before the aggregate result is inspected)
    BatchFinished {
        operation: OperationKind,
        target: String,
        succeeded: usize,
        failed: usize,
    },

    /// A target hook ran
    HookExecuted {
        target: String,
        hook: String,
        success: bool,
    },
}

/// Trait for receiving operation events
///
/// Implementations can be:
/// - TracingEventSink: structured log lines
/// - NoopEventSink: silent operation
/// - recording sinks in tests
pub trait OperationEventSink: Send + Sync {
    /// Handle an operation event
    fn on_event(&self, event: OperationEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl OperationEventSink for NoopEventSink {
    fn on_event(&self, _event: OperationEvent) {}
}
