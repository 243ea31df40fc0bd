//! Compiler dispatch
//!
//! Maps a `compiler` target onto one of the backends and runs it file by
//! file. Per-file failures become error messages in the [`CompileResult`];
//! only precondition failures (unsupported compiler, unknown encoding,
//! invalid pattern) are returned as `Err`.

mod backends;
mod context;
mod encoding;
mod sources;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use backends::{backend_for, option_args, Backend, OptionStyle};
pub use context::{create_compiler_context, CompileOptions, CompilerContext};
pub use encoding::{encode_text, resolve_encoding};
pub use sources::{collect_sources, IGNORE_FILE_NAME};

use crate::domain::ports::{FileSystem, ToolRunner};
use crate::domain::value_objects::{CompileResult, CompileResultMessage, Compiler};
use crate::error::SyncResult;

/// A backend bound to its options, ready to compile single files
pub struct PreparedCompile<'a> {
    backend: Backend,
    options: &'a CompileOptions,
    encoding: &'static encoding_rs::Encoding,
    out_dir: PathBuf,
    extension: String,
}

impl<'a> PreparedCompile<'a> {
    /// Validate the preconditions of a run.
    pub fn new(compiler: Compiler, options: &'a CompileOptions) -> SyncResult<Self> {
        let backend = backend_for(compiler)?;
        let encoding = resolve_encoding(options.encoding.as_deref())?;
        let out_dir = options
            .out_dir
            .clone()
            .unwrap_or_else(|| options.workspace_root.clone());
        let extension = options
            .extension
            .as_deref()
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .unwrap_or(compiler.default_target_extension())
            .to_string();

        Ok(Self {
            backend,
            options,
            encoding,
            out_dir,
            extension,
        })
    }

    pub fn compiler(&self) -> Compiler {
        self.backend.compiler
    }

    /// Include and exclude patterns in effect
    pub fn patterns(&self) -> (Vec<String>, Vec<String>) {
        if self.options.files.iter().any(|p| !p.trim().is_empty()) {
            (self.options.files.clone(), self.options.exclude.clone())
        } else {
            let mut exclude = self.options.exclude.clone();
            if let Some(default) = self.backend.default_exclude {
                exclude.push(default.to_string());
            }
            (vec![self.backend.default_include()], exclude)
        }
    }

    /// Source files this run would compile
    pub fn sources(&self) -> SyncResult<Vec<PathBuf>> {
        let (include, exclude) = self.patterns();
        collect_sources(
            &self.options.workspace_root,
            &include,
            &exclude,
            self.options.only.as_deref(),
        )
    }

    /// `<out_dir>/<source stem>.<extension>`
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.out_dir.join(format!("{}.{}", stem, self.extension))
    }

    /// Compile one source whose content is already loaded.
    pub fn compile_source(
        &self,
        source: &Path,
        input: Vec<u8>,
        runner: &dyn ToolRunner,
        fs: &dyn FileSystem,
    ) -> CompileResult {
        let compiler = self.compiler();
        let mut result = CompileResult::default();
        let fail = |message: String| CompileResultMessage::error(compiler, source, message);

        let output = self.output_path(source);
        if let Err(e) = fs.create_dir_all(&self.out_dir) {
            result.messages.push(fail(format!(
                "cannot create {}: {}",
                self.out_dir.display(),
                e
            )));
            return result;
        }

        let invocation = self.backend.invocation(
            self.options.tool.as_deref(),
            &self.options.passthrough,
            source,
            input,
        );
        let tool_output = match runner.run(&invocation) {
            Ok(out) => out,
            Err(e) => {
                result
                    .messages
                    .push(fail(format!("cannot run {}: {}", invocation.program, e)));
                return result;
            }
        };

        if !tool_output.success {
            let message = if tool_output.stderr.is_empty() {
                format!("{} failed", invocation.program)
            } else {
                tool_output.stderr.clone()
            };
            result.messages.push(fail(message));
            return result;
        }

        if self.backend.stderr_as_warnings {
            for line in tool_output.stderr.lines().filter(|l| !l.trim().is_empty()) {
                result
                    .messages
                    .push(CompileResultMessage::warning(compiler, source, line.trim()));
            }
        }

        let text = String::from_utf8_lossy(&tool_output.stdout);
        let bytes = encode_text(&text, self.encoding);
        match fs.write(&output, &bytes) {
            Ok(()) => {
                debug!(source = %source.display(), output = %output.display(), "compiled");
                result.outputs.push(output);
            }
            Err(e) => result.messages.push(fail(format!(
                "cannot write {}: {}",
                output.display(),
                e
            ))),
        }
        result
    }
}

/// Run a compiler over every matching source.
pub fn compile(
    compiler: Compiler,
    options: &CompileOptions,
    runner: &dyn ToolRunner,
    fs: &dyn FileSystem,
) -> SyncResult<CompileResult> {
    let prepared = PreparedCompile::new(compiler, options)?;
    let mut result = CompileResult::default();

    for source in prepared.sources()? {
        match fs.read(&source) {
            Ok(input) => result.merge(prepared.compile_source(&source, input, runner, fs)),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "cannot read source");
                result.messages.push(CompileResultMessage::error(
                    compiler,
                    &source,
                    format!("cannot read source: {}", e),
                ));
            }
        }
    }
    Ok(result)
}

/// Compile everything a context selects
pub fn compile_context(
    context: &CompilerContext,
    runner: &dyn ToolRunner,
    fs: &dyn FileSystem,
) -> SyncResult<CompileResult> {
    compile(context.compiler, &context.options, runner, fs)
}
