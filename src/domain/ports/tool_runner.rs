//! Tool Runner Port
//!
//! Compiler backends wrap external tools; this port runs them so backends
//! can be tested without the tools installed.

use std::io;
use std::path::PathBuf;

/// One tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes written to the tool's stdin
    pub stdin: Vec<u8>,
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

pub trait ToolRunner: Send + Sync {
    /// Run the tool to completion. `Err` means it could not be started.
    fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput>;
}
