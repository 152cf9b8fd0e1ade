//! Command implementations
//!
//! Each subcommand resolves the two tree roots, builds the core types it
//! needs, and renders the outcome either as colored text or as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use tracing::debug;

use agentsync_core::settings::SETTINGS_FILE;
use agentsync_core::{
    Category, ConflictResolver, Direction, HookDifference, PermissionDifference, PluginDifference,
    Reporter, SettingsAnalysis, SyncEngine, SyncOptions, SyncResult, analyze, load_settings,
};
use agentsync_fs::BackupManager;

use crate::cli::SyncArgs;
use crate::error::{CliError, Result};
use crate::prompt::DialoguerPrompt;

/// The two tree roots a command operates on
#[derive(Debug, Clone)]
pub struct Roots {
    pub project: PathBuf,
    pub global: PathBuf,
}

/// Resolve the tree roots from flags or their defaults.
///
/// # Errors
///
/// Fails when no `--global-dir` is given and the home directory cannot
/// be determined.
pub fn resolve_roots(project: Option<PathBuf>, global: Option<PathBuf>) -> Result<Roots> {
    let project = match project {
        Some(dir) => dir,
        None => std::env::current_dir()?.join(".agent"),
    };
    let global = match global {
        Some(dir) => dir,
        None => dirs::home_dir()
            .ok_or_else(|| CliError::user("Could not determine home directory; pass --global-dir"))?
            .join(".agent"),
    };
    debug!(project = %project.display(), global = %global.display(), "resolved tree roots");
    Ok(Roots { project, global })
}

/// Reporter that writes progress to the terminal.
///
/// Suppressed entirely under `--json` so machine output stays parseable.
struct TerminalReporter {
    quiet: bool,
}

impl Reporter for TerminalReporter {
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", format!("warning: {message}").yellow());
        }
    }
}

/// Run a push or pull.
pub fn run_sync(direction: Direction, args: &SyncArgs, roots: &Roots) -> Result<()> {
    let categories = if args.categories.is_empty() {
        Category::default_set()
    } else {
        args.categories
            .iter()
            .map(|name| Category::parse(name))
            .collect::<agentsync_core::Result<Vec<_>>>()?
    };

    let reporter: Arc<dyn Reporter> = Arc::new(TerminalReporter { quiet: args.json });
    let resolver = if args.force {
        ConflictResolver::forced(Arc::clone(&reporter))
    } else {
        ConflictResolver::new(Box::new(DialoguerPrompt), Arc::clone(&reporter))
    };

    let mut engine = SyncEngine::new(
        roots.project.clone(),
        roots.global.clone(),
        resolver,
        Arc::clone(&reporter),
    );
    let options = SyncOptions {
        force: args.force,
        dry_run: args.dry_run,
    };
    let result = engine.sync(direction, &categories, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_sync_result(direction, &result, args.dry_run);
    }
    Ok(())
}

fn render_sync_result(direction: Direction, result: &SyncResult, dry_run: bool) {
    let summary = &result.summary;
    println!();
    if dry_run {
        println!("{}", format!("{direction} (dry-run)").bold());
    } else {
        println!("{}", direction.to_string().bold());
    }
    println!(
        "  {} copied, {} identical, {} conflicts, {} errors ({} examined)",
        summary.copied.to_string().green(),
        summary.skipped,
        summary.conflicts,
        if summary.errors > 0 {
            summary.errors.to_string().red().to_string()
        } else {
            summary.errors.to_string()
        },
        summary.total,
    );

    if !result.conflicts_resolved.is_empty() {
        println!();
        println!("{}", "Conflicts".bold());
        for (path, resolution) in &result.conflicts_resolved {
            println!("  {path}: {resolution}");
        }
    }

    if !result.errors.is_empty() {
        println!();
        println!("{}", "Errors".red().bold());
        for message in &result.errors {
            println!("  {message}");
        }
    }
}

/// Compare the two trees' settings documents.
pub fn run_settings(roots: &Roots, json: bool) -> Result<()> {
    let project_path = roots.project.join(SETTINGS_FILE);
    let global_path = roots.global.join(SETTINGS_FILE);

    let Some(project) = load_settings(&project_path)? else {
        println!(
            "Skipping settings comparison: {} is malformed",
            project_path.display()
        );
        return Ok(());
    };
    let Some(global) = load_settings(&global_path)? else {
        println!(
            "Skipping settings comparison: {} is malformed",
            global_path.display()
        );
        return Ok(());
    };

    let analysis = analyze(&project, &global);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        render_settings_analysis(&analysis);
    }
    Ok(())
}

fn render_settings_analysis(analysis: &SettingsAnalysis) {
    if !analysis.has_differences() {
        println!("{}", "Settings are in sync".green());
        return;
    }

    if !analysis.hook_differences.is_empty() {
        println!("{}", "Hook differences".bold());
        for diff in &analysis.hook_differences {
            match diff {
                HookDifference::HookCountMismatch {
                    hook_type,
                    source_count,
                    dest_count,
                } => println!(
                    "  {hook_type}: {source_count} entr{} in project, {dest_count} in global",
                    if *source_count == 1 { "y" } else { "ies" }
                ),
                HookDifference::HookInSourceOnly { hook_type, path } => {
                    println!("  {hook_type}: {path} only in project");
                }
                HookDifference::HookInDestOnly { hook_type, path } => {
                    println!("  {hook_type}: {path} only in global");
                }
            }
        }
    }
    if !analysis.permission_differences.is_empty() {
        println!("{}", "Permission differences".bold());
        for diff in &analysis.permission_differences {
            match diff {
                PermissionDifference::AllowUniqueToSource { permissions } => {
                    println!("  allow rules only in project: {}", permissions.join(", "));
                }
                PermissionDifference::AllowUniqueToDest { permissions } => {
                    println!("  allow rules only in global: {}", permissions.join(", "));
                }
                PermissionDifference::DenyListsDiffer {
                    source_deny,
                    dest_deny,
                } => {
                    println!("  {}", "deny lists differ".red());
                    println!("    project: [{}]", source_deny.join(", "));
                    println!("    global:  [{}]", dest_deny.join(", "));
                }
            }
        }
    }
    if !analysis.plugin_differences.is_empty() {
        println!("{}", "Plugin differences".bold());
        for diff in &analysis.plugin_differences {
            let PluginDifference::EnabledMismatch {
                plugin,
                source_enabled,
                dest_enabled,
            } = diff;
            println!(
                "  {plugin}: {} in project, {} in global",
                enabled_word(*source_enabled),
                enabled_word(*dest_enabled)
            );
        }
    }

    if !analysis.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        for recommendation in &analysis.recommendations {
            println!("  {} {recommendation}", "-".dimmed());
        }
    }
}

fn enabled_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// List backup runs under both trees.
pub fn run_backups(roots: &Roots) -> Result<()> {
    let mut printed_any = false;
    for (label, root) in [("project", &roots.project), ("global", &roots.global)] {
        let runs = BackupManager::list_runs(root)?;
        if runs.is_empty() {
            continue;
        }
        printed_any = true;
        println!("{} ({})", label.bold(), root.display());
        for run in runs {
            match run.metadata {
                Some(metadata) => println!(
                    "  {}  {} file{}",
                    run.name,
                    metadata.entries.len(),
                    if metadata.entries.len() == 1 { "" } else { "s" }
                ),
                None => println!("  {}  (no metadata)", run.name),
            }
        }
    }
    if !printed_any {
        println!("No backups found");
    }
    Ok(())
}
