//! Interactive conflict prompt
//!
//! Uses dialoguer for terminal-based selection. A failed or interrupted
//! read maps to [`agentsync_core::Error::Cancelled`], which the resolver
//! treats as skipping the current unit.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use colored::Colorize;
use dialoguer::Select;

use agentsync_core::{ConflictAction, ConflictContext, ConflictPrompt};

const ACTIONS: [ConflictAction; 6] = [
    ConflictAction::KeepSource,
    ConflictAction::KeepDestination,
    ConflictAction::ShowDiff,
    ConflictAction::Skip,
    ConflictAction::ApplyAllSource,
    ConflictAction::ApplyAllDestination,
];

/// Terminal prompt backed by dialoguer
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl ConflictPrompt for DialoguerPrompt {
    fn choose(&mut self, ctx: &ConflictContext<'_>) -> agentsync_core::Result<ConflictAction> {
        println!();
        println!("{} {}", "conflict:".yellow().bold(), ctx.relative_path.bold());
        println!(
            "  {:<10} {:>9}  modified {}",
            ctx.source_label.cyan(),
            format_size(ctx.source.size),
            format_mtime(ctx.source.modified)
        );
        println!(
            "  {:<10} {:>9}  modified {}",
            ctx.dest_label.cyan(),
            format_size(ctx.dest.size),
            format_mtime(ctx.dest.modified)
        );

        let items = [
            format!("Keep {} version", ctx.source_label),
            format!("Keep {} version", ctx.dest_label),
            "Show diff".to_string(),
            "Skip this file".to_string(),
            format!("Keep {} version for all remaining conflicts", ctx.source_label),
            format!("Keep {} version for all remaining conflicts", ctx.dest_label),
        ];

        let choice = Select::new()
            .with_prompt("Resolve conflict")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|_| agentsync_core::Error::Cancelled)?;

        Ok(ACTIONS[choice])
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

fn format_mtime(mtime: SystemTime) -> String {
    DateTime::<Local>::from(mtime)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
