//! Compiler backends
//!
//! Every backend wraps an external tool that reads the source on stdin and
//! writes the result to stdout.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::ports::ToolInvocation;
use crate::domain::value_objects::Compiler;
use crate::error::{SyncError, SyncResult};

/// How passthrough options become command line arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStyle {
    /// `--key=value`
    Joined,
    /// `--key value`
    Separate,
}

/// Static description of one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub compiler: Compiler,
    pub program: &'static str,
    pub base_args: &'static [&'static str],
    /// Pattern excluded unless the target sets its own patterns
    pub default_exclude: Option<&'static str>,
    /// Treat stderr of a successful run as warnings
    pub stderr_as_warnings: bool,
    pub option_style: OptionStyle,
}

impl Backend {
    /// Include pattern used when the target sets none
    pub fn default_include(&self) -> String {
        format!("**/*.{}", self.compiler.source_extension())
    }

    /// Build the tool call for one source file
    pub fn invocation(
        &self,
        tool: Option<&str>,
        passthrough: &BTreeMap<String, serde_json::Value>,
        source: &Path,
        input: Vec<u8>,
    ) -> ToolInvocation {
        let program = tool
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.program)
            .to_string();

        let mut args: Vec<String> = self.base_args.iter().map(|a| a.to_string()).collect();
        args.extend(option_args(self.option_style, passthrough));
        if self.compiler == Compiler::Pug {
            // Lets includes and extends resolve relative to the source.
            args.push("--path".to_string());
            args.push(source.to_string_lossy().into_owned());
        }

        ToolInvocation {
            program,
            args,
            stdin: input,
            cwd: source.parent().map(Path::to_path_buf),
        }
    }
}

/// Backend for a compiler.
///
/// TypeScript is a recognized key without a backend and is rejected here.
pub fn backend_for(compiler: Compiler) -> SyncResult<Backend> {
    let backend = match compiler {
        Compiler::Less => Backend {
            compiler,
            program: "lessc",
            base_args: &["-"],
            default_exclude: None,
            stderr_as_warnings: false,
            option_style: OptionStyle::Joined,
        },
        Compiler::Pug => Backend {
            compiler,
            program: "pug",
            base_args: &[],
            default_exclude: None,
            stderr_as_warnings: false,
            option_style: OptionStyle::Separate,
        },
        Compiler::CoffeeScript => Backend {
            compiler,
            program: "coffee",
            base_args: &["--compile", "--stdio"],
            default_exclude: None,
            stderr_as_warnings: false,
            option_style: OptionStyle::Separate,
        },
        Compiler::UglifyJs => Backend {
            compiler,
            program: "uglifyjs",
            base_args: &[],
            default_exclude: Some("**/*.min.js"),
            stderr_as_warnings: true,
            option_style: OptionStyle::Separate,
        },
        Compiler::HtmlMinifier => Backend {
            compiler,
            program: "html-minifier",
            base_args: &[],
            default_exclude: Some("**/*.min.html"),
            stderr_as_warnings: true,
            option_style: OptionStyle::Separate,
        },
        Compiler::TypeScript => {
            return Err(SyncError::UnsupportedCompiler {
                compiler: compiler.key().to_string(),
            })
        }
    };
    Ok(backend)
}

/// Turn passthrough options into arguments.
///
/// `true` becomes a bare flag, `false` and `null` are dropped, arrays repeat
/// the option once per element.
pub fn option_args(
    style: OptionStyle,
    options: &BTreeMap<String, serde_json::Value>,
) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options {
        let flag = format!("--{}", key.trim_start_matches('-'));
        push_option(&mut args, style, &flag, value);
    }
    args
}

fn push_option(args: &mut Vec<String>, style: OptionStyle, flag: &str, value: &serde_json::Value) {
    use serde_json::Value;

    let text = match value {
        Value::Null | Value::Bool(false) => return,
        Value::Bool(true) => {
            args.push(flag.to_string());
            return;
        }
        Value::Array(items) => {
            for item in items {
                push_option(args, style, flag, item);
            }
            return;
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match style {
        OptionStyle::Joined => args.push(format!("{}={}", flag, text)),
        OptionStyle::Separate => {
            args.push(flag.to_string());
            args.push(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn typescript_has_no_backend() {
        assert!(backend_for(Compiler::TypeScript).is_err());
        for compiler in Compiler::SUPPORTED {
            assert!(backend_for(compiler).is_ok());
        }
    }

    #[test]
    fn minifiers_exclude_minified_output() {
        let uglify = backend_for(Compiler::UglifyJs).unwrap();
        assert_eq!(uglify.default_include(), "**/*.js");
        assert_eq!(uglify.default_exclude, Some("**/*.min.js"));
    }

    #[test]
    fn option_styles() {
        let opts = options(json!({
            "compress": true,
            "mangle": false,
            "define": ["A=1", "B=2"],
            "max-line-len": 80
        }));
        assert_eq!(
            option_args(OptionStyle::Separate, &opts),
            vec!["--compress", "--define", "A=1", "--define", "B=2", "--max-line-len", "80"]
        );

        let opts = options(json!({ "include-path": "lib" }));
        assert_eq!(option_args(OptionStyle::Joined, &opts), vec!["--include-path=lib"]);
    }

    #[test]
    fn tool_override_and_cwd() {
        let less = backend_for(Compiler::Less).unwrap();
        let call = less.invocation(
            Some("/opt/bin/lessc"),
            &BTreeMap::new(),
            Path::new("/ws/css/site.less"),
            b"a{}".to_vec(),
        );
        assert_eq!(call.program, "/opt/bin/lessc");
        assert_eq!(call.args, vec!["-"]);
        assert_eq!(call.cwd.as_deref(), Some(Path::new("/ws/css")));
    }
}
