//! agentsync command-line interface

mod cli;
mod commands;
mod error;
mod prompt;

use clap::Parser;
use colored::Colorize;

use agentsync_core::Direction;

use crate::cli::{Cli, Commands};
use crate::error::Result;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let roots = commands::resolve_roots(cli.project_dir, cli.global_dir)?;

    match cli.command {
        Commands::Push(args) => commands::run_sync(Direction::Push, &args, &roots),
        Commands::Pull(args) => commands::run_sync(Direction::Pull, &args, &roots),
        Commands::Settings { json } => commands::run_settings(&roots, json),
        Commands::Backups => commands::run_backups(&roots),
    }
}
