//! Tracing Event Sink
//!
//! Forwards operation events to `tracing` as structured log lines.

use tracing::{debug, info, warn};

use crate::domain::ports::{OperationEvent, OperationEventSink};

/// Event sink that logs every event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl OperationEventSink for TracingEventSink {
    fn on_event(&self, event: OperationEvent) {
        match event {
            OperationEvent::BatchStarted {
                operation,
                target,
                file_count,
            } => info!(%operation, target, file_count, "batch started"),

            OperationEvent::FileStarted {
                operation,
                target,
                index,
                path,
                destination,
            } => debug!(
                %operation,
                target,
                index,
                path = %path.display(),
                destination = destination.as_deref().unwrap_or("-"),
                "file started"
            ),

            OperationEvent::FileCompleted {
                operation,
                target,
                path,
                ..
            } => info!(%operation, target, path = %path.display(), "file completed"),

            OperationEvent::FileFailed {
                operation,
                target,
                path,
                error,
                ..
            } => warn!(%operation, target, path = %path.display(), error, "file failed"),

            OperationEvent::BatchCancelled {
                operation,
                target,
                remaining,
            } => warn!(%operation, target, remaining, "batch cancelled"),

            OperationEvent::BatchFinished {
                operation,
                target,
                succeeded,
                failed,
            } => info!(%operation, target, succeeded, failed, "batch finished"),

            OperationEvent::HookExecuted {
                target,
                hook,
                success,
            } => {
                if success {
                    info!(target, hook, "hook executed")
                } else {
                    warn!(target, hook, "hook failed")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::OperationKind;
    use std::path::PathBuf;

    #[test]
    fn logs_without_subscriber() {
        let sink = TracingEventSink;
        sink.on_event(OperationEvent::FileFailed {
            operation: OperationKind::Delete,
            target: "prod".to_string(),
            index: 0,
            path: PathBuf::from("/ws/a.txt"),
            error: "denied".to_string(),
        });
        sink.on_event(OperationEvent::HookExecuted {
            target: "prod".to_string(),
            hook: "make".to_string(),
            success: true,
        });
    }
}
