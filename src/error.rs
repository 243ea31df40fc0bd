//! Error types for targetsync
//!
//! Uses `thiserror` for library errors. Per-file failures are reported
//! through the file lifecycle callbacks; only precondition errors (unsupported
//! compiler, invalid port, path escape) and aggregate batch failures reach the
//! caller of an operation.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::OperationKind;

/// Result type alias for targetsync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Main error type for targetsync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Compiler key does not map to a usable backend
    #[error("unsupported compiler '{compiler}'")]
    UnsupportedCompiler { compiler: String },

    /// No plugin handles this target type
    #[error("unsupported target type '{kind}' (target '{target}')")]
    UnsupportedTargetType { kind: String, target: String },

    /// Plugin exists but lacks the capability for this operation
    #[error("target '{target}' cannot {operation}")]
    CapabilityMissing {
        target: String,
        operation: OperationKind,
    },

    /// A single file's transfer, compile or delete failed
    #[error("{operation} failed for {path}: {message}")]
    FileOperation {
        operation: OperationKind,
        path: PathBuf,
        message: String,
    },

    /// A batch finished but its aggregate result contains an error entry
    #[error("{target}: {compiler} failed on {file}: {message}")]
    Aggregate {
        target: String,
        compiler: String,
        file: PathBuf,
        message: String,
    },

    /// Path escapes its expected root
    #[error("path '{path}' escapes root '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },

    /// Conditional expression could not be evaluated
    #[error("cannot evaluate condition '{expression}': {message}")]
    Condition { expression: String, message: String },

    /// Glob pattern could not be compiled
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// TCP port outside 0..=65535
    #[error("invalid TCP port {port}")]
    InvalidPort { port: i64 },

    /// Unknown text encoding label
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// A target hook failed
    #[error("hook '{hook}' of target '{target}' failed: {message}")]
    Hook {
        target: String,
        hook: String,
        message: String,
    },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Operation was cancelled before it started
    #[error("operation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Wrap any displayable failure as a per-file error.
    pub fn file_operation(
        operation: OperationKind,
        path: impl Into<PathBuf>,
        message: impl ToString,
    ) -> Self {
        Self::FileOperation {
            operation,
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for errors that are reported per file rather than per batch.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::FileOperation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_compiler() {
        let err = SyncError::UnsupportedCompiler {
            compiler: "sass".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported compiler 'sass'");
    }

    #[test]
    fn test_error_display_path_escape() {
        let err = SyncError::PathEscape {
            path: PathBuf::from("/out/../etc"),
            root: PathBuf::from("/out"),
        };
        assert_eq!(err.to_string(), "path '/out/../etc' escapes root '/out'");
    }

    #[test]
    fn test_error_display_aggregate_carries_context() {
        let err = SyncError::Aggregate {
            target: "styles".to_string(),
            compiler: "less".to_string(),
            file: PathBuf::from("/ws/a.less"),
            message: "unexpected token".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("styles"));
        assert!(text.contains("less"));
        assert!(text.contains("a.less"));
    }

    #[test]
    fn test_file_operation_is_per_file() {
        let err = SyncError::file_operation(OperationKind::Upload, "a.txt", "boom");
        assert!(err.is_per_file());
        assert_eq!(err.to_string(), "upload failed for a.txt: boom");
        assert!(!SyncError::Cancelled.is_per_file());
    }
}
