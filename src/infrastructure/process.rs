//! External process runners
//!
//! `ProcessToolRunner` feeds a compiler tool through stdin/stdout;
//! `ProcessHookRunner` executes target hooks from the workspace root.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::domain::entities::{Target, TargetOperation};
use crate::domain::ports::{HookRunner, ToolInvocation, ToolOutput, ToolRunner};
use crate::error::{SyncError, SyncResult};

/// Runs tools as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput> {
        debug!(program = %invocation.program, args = ?invocation.args, "running tool");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn()?;

        // Feed stdin from another thread so a chatty tool cannot block on a
        // full stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = invocation.stdin.clone();
            std::thread::spawn(move || stdin.write_all(&input))
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(result) => {
                    // A tool may exit without reading all input.
                    if let Err(e) = result {
                        if e.kind() != io::ErrorKind::BrokenPipe {
                            return Err(e);
                        }
                    }
                }
                Err(_) => return Err(io::Error::other("stdin writer panicked")),
            }
        }

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Runs target hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHookRunner;

impl HookRunner for ProcessHookRunner {
    fn run(&self, target: &Target, hook: &TargetOperation) -> SyncResult<()> {
        match hook {
            TargetOperation::Log { message } => {
                info!(target = %target.name, "{}", message);
                Ok(())
            }
            TargetOperation::Exec { command, args } => {
                debug!(target = %target.name, command, ?args, "running hook");
                let mut cmd = Command::new(command);
                cmd.args(args).stdin(Stdio::null());
                if !target.workspace_root.as_os_str().is_empty() {
                    cmd.current_dir(&target.workspace_root);
                }

                let output = cmd.output().map_err(|e| hook_error(target, hook, e))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let message = match output.status.code() {
                        Some(code) => format!("exit code {}: {}", code, stderr.trim()),
                        None => format!("terminated by signal: {}", stderr.trim()),
                    };
                    return Err(hook_error(target, hook, message));
                }
                Ok(())
            }
        }
    }
}

fn hook_error(target: &Target, hook: &TargetOperation, message: impl ToString) -> SyncError {
    SyncError::Hook {
        target: target.name.clone(),
        hook: hook.label(),
        message: message.to_string(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn tool_output_is_captured() {
        let output = ProcessToolRunner
            .run(&ToolInvocation {
                program: "cat".to_string(),
                stdin: b"piped".to_vec(),
                ..Default::default()
            })
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, b"piped");
    }

    #[test]
    fn missing_tool_is_an_io_error() {
        let result = ProcessToolRunner.run(&ToolInvocation {
            program: "targetsync-no-such-tool".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn failing_hook_reports_exit_code() {
        let target = Target::new("prod", "local");
        let hook = TargetOperation::Exec {
            command: "false".to_string(),
            args: vec![],
        };
        let err = ProcessHookRunner.run(&target, &hook).unwrap_err();
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn log_hook_always_succeeds() {
        let target = Target::new("prod", "local");
        let hook = TargetOperation::Log {
            message: "deployed".to_string(),
        };
        assert!(ProcessHookRunner.run(&target, &hook).is_ok());
    }
}
