//! targetsync CLI - deploy workspace files to their configured targets
//!
//! Usage: targetsync <COMMAND>
//!
//! Commands:
//!   targets  Show the targets a file resolves to
//!   deploy   Deploy files to their targets
//!   pull     Pull files from a target
//!   delete   Delete files from their targets
//!   list     List a directory of a target
//!   watch    Deploy on save
//!   proxy    Run the configured TCP proxies

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::Output;

fn main() -> Result<()> {
    let cli = Cli::parse();
    targetsync::logging::init(cli.verbose);

    let project = commands::project::open_project(&cli)?;
    let output = Output::from_cli(&cli);

    match &cli.command {
        Commands::Targets {
            file,
            fast,
            on_save,
        } => commands::targets::cmd_targets(&project, file, *fast, *on_save, cli.json),
        Commands::Deploy { files, target } => {
            commands::transfer::cmd_deploy(&project, files, target.as_deref(), &output)
        }
        Commands::Pull { files, target } => {
            commands::transfer::cmd_pull(&project, files, target.as_deref(), &output)
        }
        Commands::Delete { files, target } => {
            commands::transfer::cmd_delete(&project, files, target.as_deref(), &output)
        }
        Commands::List { target, dir } => commands::list::cmd_list(&project, target, dir, &output),
        Commands::Watch => commands::watch::cmd_watch(&project, cli.json),
        Commands::Proxy { port } => commands::proxy::cmd_proxy(&project, *port, cli.json),
    }
}
