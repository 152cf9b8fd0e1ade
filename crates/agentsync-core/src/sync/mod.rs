//! Sync orchestration
//!
//! The orchestrator enumerates categories and units in a stable
//! lexicographic order, classifies each pair as new / identical /
//! conflicting by content hash, delegates conflicts to the resolver, and
//! applies the chosen action through the integrity layer. Per-unit
//! failures are recorded and never abort the run.

mod engine;

pub use engine::SyncEngine;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::conflict::Resolution;

/// Direction of synchronization: which tree is the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// project -> global
    Push,
    /// global -> project
    Pull,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => f.write_str("push"),
            Self::Pull => f.write_str("pull"),
        }
    }
}

/// Options for one sync run
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Resolve conflicts by recency without prompting
    pub force: bool,
    /// Do all read/hash work but suppress writes, deletes, and backups
    pub dry_run: bool,
}

/// Counters summarizing one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub copied: usize,
    pub skipped: usize,
    pub conflicts: usize,
    pub errors: usize,
    /// Units examined in total
    pub total: usize,
}

/// Aggregate outcome of one orchestrator run.
///
/// Owned by the caller once returned; the engine never retains or mutates
/// a result after handing it out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    /// Relative paths copied (or, under dry-run, that would be copied),
    /// in enumeration order
    pub files_copied: Vec<String>,
    /// Relative paths skipped because both sides hash identically
    pub files_skipped: Vec<String>,
    /// Conflicting paths and the action ultimately taken for each
    pub conflicts_resolved: BTreeMap<String, Resolution>,
    /// Per-unit error messages; the run continued past each of these
    pub errors: Vec<String>,
    pub summary: SyncSummary,
}

impl SyncResult {
    pub(crate) fn finalize(&mut self, total: usize) {
        self.summary = SyncSummary {
            copied: self.files_copied.len(),
            skipped: self.files_skipped.len(),
            conflicts: self.conflicts_resolved.len(),
            errors: self.errors.len(),
            total,
        };
    }
}
