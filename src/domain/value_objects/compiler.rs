//! Compiler value object - which tool a compiler target runs

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Compiler backing a `compiler` target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    Less,
    /// Recognized key without a backend
    TypeScript,
    UglifyJs,
    Pug,
    HtmlMinifier,
    CoffeeScript,
}

impl Compiler {
    /// Every compiler with a working backend
    pub const SUPPORTED: [Compiler; 5] = [
        Compiler::Less,
        Compiler::UglifyJs,
        Compiler::Pug,
        Compiler::HtmlMinifier,
        Compiler::CoffeeScript,
    ];

    /// Map a configured key onto a compiler.
    ///
    /// Case-insensitive; accepts the aliases `uglify-js`, `html-min`,
    /// `htmlmin` and `coffee`.
    pub fn from_key(key: &str) -> SyncResult<Compiler> {
        match key.trim().to_lowercase().as_str() {
            "less" => Ok(Compiler::Less),
            "typescript" => Ok(Compiler::TypeScript),
            "uglifyjs" | "uglify-js" => Ok(Compiler::UglifyJs),
            "pug" => Ok(Compiler::Pug),
            "htmlminifier" | "html-min" | "htmlmin" => Ok(Compiler::HtmlMinifier),
            "coffeescript" | "coffee" => Ok(Compiler::CoffeeScript),
            _ => Err(SyncError::UnsupportedCompiler {
                compiler: key.to_string(),
            }),
        }
    }

    /// Canonical key
    pub fn key(&self) -> &'static str {
        match self {
            Compiler::Less => "less",
            Compiler::TypeScript => "typescript",
            Compiler::UglifyJs => "uglifyjs",
            Compiler::Pug => "pug",
            Compiler::HtmlMinifier => "htmlminifier",
            Compiler::CoffeeScript => "coffeescript",
        }
    }

    /// Extension of the files the compiler reads
    pub fn source_extension(&self) -> &'static str {
        match self {
            Compiler::Less => "less",
            Compiler::TypeScript => "ts",
            Compiler::UglifyJs => "js",
            Compiler::Pug => "pug",
            Compiler::HtmlMinifier => "html",
            Compiler::CoffeeScript => "coffee",
        }
    }

    /// Extension of the files the compiler writes unless configured otherwise
    pub fn default_target_extension(&self) -> &'static str {
        match self {
            Compiler::Less => "css",
            Compiler::TypeScript => "js",
            Compiler::UglifyJs => "min.js",
            Compiler::Pug => "html",
            Compiler::HtmlMinifier => "min.html",
            Compiler::CoffeeScript => "js",
        }
    }

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl std::fmt::Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
