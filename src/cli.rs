//! CLI Argument Parsing
//!
//! Global flags (--config, --root, --json, --verbose, --ascii) are inherited
//! by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// targetsync - deploy workspace files to configured targets
#[derive(Parser, Debug)]
#[command(name = "targetsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: .targetsync/config.toml, then the user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project directory (default: discovered from the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Use ASCII icons instead of Unicode
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the targets a file resolves to
    Targets {
        file: PathBuf,

        /// Match by path patterns only (skip conditions and platforms)
        #[arg(long)]
        fast: bool,

        /// Use the deploy-on-save package rules
        #[arg(long)]
        on_save: bool,
    },

    /// Deploy files to their targets
    Deploy {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Deploy to this target only
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Pull files from a target into the workspace
    Pull {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target to pull from (prompted when several apply)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Delete files from their targets
    Delete {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Delete from this target only
        #[arg(short, long)]
        target: Option<String>,
    },

    /// List a directory of a target
    List {
        target: String,

        #[arg(default_value = "/")]
        dir: String,
    },

    /// Deploy files to their deploy-on-save targets whenever they change
    Watch,

    /// Run the configured TCP proxies until Ctrl+C
    Proxy {
        /// Only run the proxy on this port
        #[arg(short, long)]
        port: Option<i64>,
    },
}
