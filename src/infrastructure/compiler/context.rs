//! Compiler context derived from a `compiler` target
//!
//! Recomputed on every operation; never cached.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entities::Target;
use crate::domain::value_objects::Compiler;
use crate::error::{SyncError, SyncResult};

/// Everything a compile run needs to know about its target
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerContext {
    pub compiler: Compiler,
    pub target_name: String,
    pub workspace_root: PathBuf,
    /// Absolute, normalized output directory
    pub out_dir: PathBuf,
    pub source_extension: &'static str,
    pub target_extension: String,
    pub options: CompileOptions,
}

/// Options handed to a compiler backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    pub workspace_root: PathBuf,
    /// Include patterns; the backend default applies when empty
    pub files: Vec<String>,
    pub exclude: Vec<String>,
    /// Output directory; the workspace root when unset
    pub out_dir: Option<PathBuf>,
    /// Output encoding label, `utf-8` when unset
    pub encoding: Option<String>,
    /// Output extension, the compiler default when unset
    pub extension: Option<String>,
    /// Executable overriding the backend's tool
    pub tool: Option<String>,
    /// Restrict the run to these files (still subject to the patterns)
    pub only: Option<Vec<PathBuf>>,
    /// Passthrough options for the tool
    pub passthrough: BTreeMap<String, serde_json::Value>,
}

impl CompileOptions {
    pub fn with_only(mut self, files: Vec<PathBuf>) -> Self {
        self.only = Some(files);
        self
    }
}

/// Build the context for a compiler target.
///
/// Fails with [`SyncError::UnsupportedCompiler`] when the target has no
/// compiler or names one that is not in the key table.
pub fn create_compiler_context(target: &Target) -> SyncResult<CompilerContext> {
    let settings = target
        .compiler
        .as_ref()
        .ok_or_else(|| SyncError::UnsupportedCompiler {
            compiler: String::new(),
        })?;
    let compiler = Compiler::from_key(&settings.compiler)?;

    let out_dir = target.resolved_dir();
    let target_extension = settings
        .extension
        .as_deref()
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .unwrap_or(compiler.default_target_extension())
        .to_string();

    Ok(CompilerContext {
        compiler,
        target_name: target.name.clone(),
        workspace_root: target.workspace_root.clone(),
        out_dir: out_dir.clone(),
        source_extension: compiler.source_extension(),
        target_extension: target_extension.clone(),
        options: CompileOptions {
            workspace_root: target.workspace_root.clone(),
            files: settings.files.clone(),
            exclude: settings.exclude.clone(),
            out_dir: Some(out_dir),
            encoding: settings.encoding.clone(),
            extension: Some(target_extension),
            tool: settings.tool.clone(),
            only: None,
            passthrough: settings.options.clone(),
        },
    })
}
