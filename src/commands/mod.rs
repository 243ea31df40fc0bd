//! Subcommand implementations

pub(crate) mod list;
pub(crate) mod project;
pub(crate) mod prompt;
pub(crate) mod proxy;
pub(crate) mod targets;
pub(crate) mod transfer;
pub(crate) mod watch;

use anyhow::{bail, Result};
use tracing::warn;

use targetsync::presentation::{create_renderer, OutcomeRenderer, OutputFormat};
use targetsync::{CancellationFlag, OperationKind, TargetOutcome};

use crate::cli::Cli;

/// How results are printed
pub(crate) struct Output {
    pub renderer: Box<dyn OutcomeRenderer>,
}

impl Output {
    pub fn from_cli(cli: &Cli) -> Self {
        let format = if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        Self {
            renderer: create_renderer(format, !cli.ascii, cli.verbose),
        }
    }

    /// Print the outcomes and fail when any target did not fully succeed.
    pub fn finish(&self, operation: OperationKind, outcomes: &[TargetOutcome]) -> Result<()> {
        println!("{}", self.renderer.render(operation, outcomes));
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            bail!("{} of {} targets failed", failed, outcomes.len());
        }
        Ok(())
    }
}

/// Cancel the running batch on Ctrl+C.
pub(crate) fn install_cancel_handler(cancel: CancellationFlag) {
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!(error = %e, "failed to install Ctrl+C handler");
    }
}
