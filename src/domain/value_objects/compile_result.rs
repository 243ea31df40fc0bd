//! Structured outcome of a compiler run

use std::path::PathBuf;

use serde::Serialize;

use super::Compiler;

/// Severity of a compile message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    Error,
    Warning,
    Info,
}

/// One per-file entry of a compile run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResultMessage {
    pub category: MessageCategory,
    pub compiler: Compiler,
    pub file: PathBuf,
    pub message: String,
}

impl CompileResultMessage {
    pub fn error(compiler: Compiler, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            category: MessageCategory::Error,
            compiler,
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        compiler: Compiler,
        file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: MessageCategory::Warning,
            compiler,
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == MessageCategory::Error
    }
}

/// Result of a compile run. Never carries per-file failures as `Err`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    pub messages: Vec<CompileResultMessage>,
    /// Output files written by the run
    pub outputs: Vec<PathBuf>,
}

impl CompileResult {
    /// First error-category entry, if any
    pub fn first_error(&self) -> Option<&CompileResultMessage> {
        self.messages.iter().find(|m| m.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompileResultMessage> {
        self.messages
            .iter()
            .filter(|m| m.category == MessageCategory::Warning)
    }

    pub fn merge(&mut self, other: CompileResult) {
        self.messages.extend(other.messages);
        self.outputs.extend(other.outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_skips_warnings() {
        let result = CompileResult {
            messages: vec![
                CompileResultMessage::warning(Compiler::UglifyJs, "a.js", "dropped unused"),
                CompileResultMessage::error(Compiler::UglifyJs, "b.js", "unexpected token"),
                CompileResultMessage::error(Compiler::UglifyJs, "c.js", "second"),
            ],
            outputs: vec![],
        };
        let first = result.first_error().unwrap();
        assert_eq!(first.file, PathBuf::from("b.js"));
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn empty_result_has_no_error() {
        assert!(CompileResult::default().first_error().is_none());
    }
}
