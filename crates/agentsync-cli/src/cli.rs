//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// agentsync - Reconcile project-local and user-global assistant
/// configuration trees
#[derive(Parser, Debug)]
#[command(name = "agentsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project tree root (default: ./.agent)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Global tree root (default: ~/.agent)
    #[arg(long, global = true, value_name = "DIR")]
    pub global_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared flags for the two sync directions
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Categories to sync (default: all except prompts)
    ///
    /// Examples:
    ///   agentsync push                      # default categories
    ///   agentsync push -c commands -c skills
    ///   agentsync push -c prompts           # prompts only when asked
    #[arg(short, long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Resolve conflicts automatically by file recency (never prompts)
    #[arg(long)]
    pub force: bool,

    /// Preview changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Output the result as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync project tree to the global tree
    Push(SyncArgs),

    /// Sync global tree to the project tree
    Pull(SyncArgs),

    /// Compare the two trees' settings.json documents
    Settings {
        /// Output the analysis as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List backup runs under the trees' .backups directories
    Backups,
}
