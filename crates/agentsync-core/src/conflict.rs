//! Conflict resolution state machine
//!
//! One resolver instance lives across a whole orchestrator run. It starts
//! interactive, can be moved into a batch state by an "apply to all"
//! choice (persisting until [`ConflictResolver::reset_batch_mode`]), or is
//! constructed forced, in which case it never prompts and resolves every
//! conflict by file recency.
//!
//! The interactive loop is explicit: `ShowDiff` renders a unified diff and
//! re-prompts for the same file; only terminal actions exit the loop.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use agentsync_fs::FileRecord;

use crate::diff::render_file_diff;
use crate::reporter::Reporter;
use crate::{Error, Result};

/// One choice offered for a conflicting unit.
///
/// `ShowDiff` is non-terminal: the resolver renders a diff and asks again.
/// The `ApplyAll*` variants resolve the current unit and put the resolver
/// into the corresponding batch state for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    KeepSource,
    KeepDestination,
    ShowDiff,
    Skip,
    ApplyAllSource,
    ApplyAllDestination,
}

/// Terminal outcome of resolving one conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    KeepSource,
    KeepDestination,
    Skip,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeepSource => f.write_str("keep source"),
            Self::KeepDestination => f.write_str("keep destination"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Everything a prompt needs to present one conflict
#[derive(Debug)]
pub struct ConflictContext<'a> {
    /// Path relative to the tree roots
    pub relative_path: &'a str,
    /// Human name for the source side (e.g. "project")
    pub source_label: &'a str,
    /// Human name for the destination side (e.g. "global")
    pub dest_label: &'a str,
    /// Source-side metadata
    pub source: &'a FileRecord,
    /// Destination-side metadata
    pub dest: &'a FileRecord,
    /// Absolute path of the source unit
    pub source_path: &'a Path,
    /// Absolute path of the destination unit
    pub dest_path: &'a Path,
    /// Whether the unit is a directory (diffs are not rendered for these)
    pub is_directory: bool,
}

/// Source of interactive decisions.
///
/// The CLI implements this with dialoguer; tests script it. An
/// implementation signals a keyboard interrupt by returning
/// [`Error::Cancelled`], which the resolver treats as `Skip` for the
/// current unit only.
pub trait ConflictPrompt {
    fn choose(&mut self, ctx: &ConflictContext<'_>) -> Result<ConflictAction>;
}

enum Mode {
    Interactive(Box<dyn ConflictPrompt>),
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchChoice {
    Source,
    Destination,
}

/// Decision procedure for conflicting units.
///
/// States: interactive (default), batch-source / batch-destination
/// (entered via `ApplyAll*`, left via [`Self::reset_batch_mode`]), and
/// forced (construction-time, never prompts).
pub struct ConflictResolver {
    mode: Mode,
    batch: Option<BatchChoice>,
    reporter: Arc<dyn Reporter>,
}

impl ConflictResolver {
    /// Create an interactive resolver backed by the given prompt.
    pub fn new(prompt: Box<dyn ConflictPrompt>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            mode: Mode::Interactive(prompt),
            batch: None,
            reporter,
        }
    }

    /// Create a forced resolver: conflicts resolve by recency, the newer
    /// side wins, ties go to the source. Never prompts.
    pub fn forced(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            mode: Mode::Forced,
            batch: None,
            reporter,
        }
    }

    /// Leave any batch state and return to interactive prompting.
    /// Intended for use between independent sync operations within the
    /// same process. A forced resolver is unaffected.
    pub fn reset_batch_mode(&mut self) {
        self.batch = None;
    }

    /// Resolve one conflicting unit to a terminal action.
    pub fn resolve(&mut self, ctx: &ConflictContext<'_>) -> Result<Resolution> {
        if let Some(batch) = self.batch {
            let resolution = match batch {
                BatchChoice::Source => Resolution::KeepSource,
                BatchChoice::Destination => Resolution::KeepDestination,
            };
            debug!(path = %ctx.relative_path, %resolution, "batch mode resolution");
            return Ok(resolution);
        }

        match &mut self.mode {
            Mode::Forced => Ok(Self::resolve_by_recency(ctx, &*self.reporter)),
            Mode::Interactive(prompt) => loop {
                let action = match prompt.choose(ctx) {
                    Ok(action) => action,
                    Err(Error::Cancelled) => {
                        self.reporter
                            .warn(&format!("interrupted; skipping {}", ctx.relative_path));
                        return Ok(Resolution::Skip);
                    }
                    Err(e) => return Err(e),
                };

                match action {
                    ConflictAction::KeepSource => return Ok(Resolution::KeepSource),
                    ConflictAction::KeepDestination => return Ok(Resolution::KeepDestination),
                    ConflictAction::Skip => return Ok(Resolution::Skip),
                    ConflictAction::ApplyAllSource => {
                        self.batch = Some(BatchChoice::Source);
                        return Ok(Resolution::KeepSource);
                    }
                    ConflictAction::ApplyAllDestination => {
                        self.batch = Some(BatchChoice::Destination);
                        return Ok(Resolution::KeepDestination);
                    }
                    ConflictAction::ShowDiff => show_diff(&*self.reporter, ctx),
                }
            },
        }
    }

    fn resolve_by_recency(ctx: &ConflictContext<'_>, reporter: &dyn Reporter) -> Resolution {
        let source_mtime = ctx.source.modified;
        let dest_mtime = ctx.dest.modified;
        // Ties go to the source side.
        let resolution = if source_mtime >= dest_mtime {
            Resolution::KeepSource
        } else {
            Resolution::KeepDestination
        };
        reporter.info(&format!(
            "{}: forced resolution by recency -> {resolution}",
            ctx.relative_path
        ));
        debug!(
            path = %ctx.relative_path,
            source_newer = source_mtime >= dest_mtime,
            "forced resolution"
        );
        resolution
    }
}

fn show_diff(reporter: &dyn Reporter, ctx: &ConflictContext<'_>) {
    if ctx.is_directory {
        reporter.info("(directory contents differ; per-file diff not shown)");
        return;
    }
    match render_file_diff(
        ctx.source_label,
        ctx.dest_label,
        ctx.source_path,
        ctx.dest_path,
    ) {
        Ok(rendered) => reporter.block(&rendered),
        Err(e) => reporter.warn(&format!(
            "could not render diff for {}: {e}",
            ctx.relative_path
        )),
    }
}
