//! Lumi CLI - lumi command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cmd;
mod progress;
mod util;

/// Lumi - deduplicating snapshots of a working directory
#[derive(Parser)]
#[command(name = "lumi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging. Repeat for more (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository in the current directory
    Init,
    /// Save the working tree as a new package of a group
    Save {
        /// Package group name
        group: String,
    },
    /// Restore a package into the working tree
    Load {
        /// Package group name
        group: String,
        /// Package name or zero-based index (default: latest)
        package: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Keep files that are not part of the package
        #[arg(short, long)]
        keep: bool,
    },
    /// List package groups, most recent first
    List,
    /// Show the packages of a group, oldest first
    History {
        /// Package group name
        group: String,
    },
    /// Show every group and package as a tree
    Tree,
    /// Delete a group, or a single package of it
    Delete {
        /// Package group name
        group: String,
        /// Package name or zero-based index
        package: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Remove stored content no package references
    Cleanup,
    /// Delete the repository and every package in it
    Wipe {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            util::print_error(&e);
            // 1: refused before touching anything, 2: failed while working
            let refused = e
                .downcast_ref::<lumi_core::Error>()
                .is_some_and(|e| e.is_precondition());
            ExitCode::from(if refused { 1 } else { 2 })
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init => cmd::init::run(),
        Commands::Save { group } => cmd::save::run(&group),
        Commands::Load {
            group,
            package,
            force,
            keep,
        } => cmd::load::run(&group, package.as_deref(), force, keep),
        Commands::List => cmd::list::run(),
        Commands::History { group } => cmd::history::run(&group),
        Commands::Tree => cmd::tree::run(),
        Commands::Delete { group, package, force } => cmd::delete::run(&group, package.as_deref(), force),
        Commands::Cleanup => cmd::cleanup::run(),
        Commands::Wipe { force } => cmd::wipe::run(force),
    }
}
