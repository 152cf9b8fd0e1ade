//! SyncEngine implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use agentsync_fs::{BackupManager, CopyOutcome, FileRecord, copy_verified, replace_directory};

use crate::category::Category;
use crate::conflict::{ConflictContext, ConflictResolver, Resolution};
use crate::reporter::Reporter;
use crate::sync::{Direction, SyncOptions, SyncResult};
use crate::{Error, Result};

/// Engine for reconciling the project and global trees.
///
/// One engine holds one resolver across its lifetime, so batch-mode
/// decisions persist between [`SyncEngine::sync`] calls until
/// [`SyncEngine::reset_batch_mode`] is called. Only ever copies
/// source -> destination; units present only at the destination are left
/// untouched.
pub struct SyncEngine {
    project_root: PathBuf,
    global_root: PathBuf,
    resolver: ConflictResolver,
    reporter: Arc<dyn Reporter>,
}

impl SyncEngine {
    /// Create a new engine over the two tree roots.
    pub fn new(
        project_root: impl Into<PathBuf>,
        global_root: impl Into<PathBuf>,
        resolver: ConflictResolver,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            global_root: global_root.into(),
            resolver,
            reporter,
        }
    }

    /// Return the resolver to interactive mode between independent sync
    /// operations.
    pub fn reset_batch_mode(&mut self) {
        self.resolver.reset_batch_mode();
    }

    /// Run one synchronization pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty category set, before any
    /// I/O happens. Per-unit failures are recorded in the result's error
    /// list instead of propagating.
    pub fn sync(
        &mut self,
        direction: Direction,
        categories: &[Category],
        options: &SyncOptions,
    ) -> Result<SyncResult> {
        if categories.is_empty() {
            return Err(Error::validation("No categories selected"));
        }
        let mut categories = categories.to_vec();
        categories.sort();
        categories.dedup();

        let (src_root, dest_root, source_label, dest_label) = match direction {
            Direction::Push => (
                self.project_root.clone(),
                self.global_root.clone(),
                "project",
                "global",
            ),
            Direction::Pull => (
                self.global_root.clone(),
                self.project_root.clone(),
                "global",
                "project",
            ),
        };

        debug!(%direction, dry_run = options.dry_run, force = options.force, "starting sync");

        let mut backup = BackupManager::new(&dest_root);
        let mut forced = options
            .force
            .then(|| ConflictResolver::forced(Arc::clone(&self.reporter)));
        let mut result = SyncResult::default();
        let mut total = 0;

        for category in categories {
            let src_dir = src_root.join(category.dir_name());
            if !src_dir.is_dir() {
                continue;
            }
            let units = match list_units(&src_dir, category.is_directory_category()) {
                Ok(units) => units,
                Err(e) => {
                    result.errors.push(format!("{category}: {e}"));
                    continue;
                }
            };

            for name in units {
                total += 1;
                let rel = format!("{}/{}", category.dir_name(), name);
                if let Err(e) = self.sync_unit(
                    &src_root,
                    &dest_root,
                    source_label,
                    dest_label,
                    category,
                    &rel,
                    options,
                    &mut backup,
                    &mut forced,
                    &mut result,
                ) {
                    self.reporter.warn(&format!("{rel}: {e}"));
                    result.errors.push(format!("{rel}: {e}"));
                }
            }
        }

        result.finalize(total);
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn sync_unit(
        &mut self,
        src_root: &Path,
        dest_root: &Path,
        source_label: &'static str,
        dest_label: &'static str,
        category: Category,
        rel: &str,
        options: &SyncOptions,
        backup: &mut BackupManager,
        forced: &mut Option<ConflictResolver>,
        result: &mut SyncResult,
    ) -> Result<()> {
        let is_directory = category.is_directory_category();
        let src_path = src_root.join(rel);
        let dest_path = dest_root.join(rel);

        // Present only at the source: copy directly, nothing to back up.
        if !dest_path.exists() {
            let outcome = transfer(src_root, dest_root, rel, is_directory, None, options.dry_run)?;
            self.report_copy(&outcome);
            result.files_copied.push(rel.to_string());
            return Ok(());
        }

        let (source, dest) = if is_directory {
            (
                FileRecord::capture_dir(src_root, rel)?,
                FileRecord::capture_dir(dest_root, rel)?,
            )
        } else {
            (
                FileRecord::capture(src_root, rel)?,
                FileRecord::capture(dest_root, rel)?,
            )
        };

        if source.checksum == dest.checksum {
            debug!(path = %rel, "content identical; skipping");
            result.files_skipped.push(rel.to_string());
            return Ok(());
        }

        let ctx = ConflictContext {
            relative_path: rel,
            source_label,
            dest_label,
            source: &source,
            dest: &dest,
            source_path: &src_path,
            dest_path: &dest_path,
            is_directory,
        };
        let resolution = match forced.as_mut() {
            Some(resolver) => resolver.resolve(&ctx)?,
            None => self.resolver.resolve(&ctx)?,
        };
        result
            .conflicts_resolved
            .insert(rel.to_string(), resolution);

        if resolution == Resolution::KeepSource {
            let outcome = transfer(
                src_root,
                dest_root,
                rel,
                is_directory,
                Some(backup),
                options.dry_run,
            )?;
            self.report_copy(&outcome);
            result.files_copied.push(rel.to_string());
        }

        Ok(())
    }

    fn report_copy(&self, outcome: &CopyOutcome) {
        if outcome.written {
            self.reporter.info(&format!("copied {}", outcome.path));
        } else {
            self.reporter
                .info(&format!("[dry-run] Would copy {}", outcome.path));
        }
    }
}

fn transfer(
    src_root: &Path,
    dest_root: &Path,
    rel: &str,
    is_directory: bool,
    backup: Option<&mut BackupManager>,
    dry_run: bool,
) -> Result<CopyOutcome> {
    let outcome = if is_directory {
        replace_directory(src_root, dest_root, rel, backup, dry_run)?
    } else {
        copy_verified(src_root, dest_root, rel, backup, dry_run)?
    };
    Ok(outcome)
}

/// List unit names in a category directory, lexicographically sorted.
///
/// File categories list regular files; directory categories list
/// immediate subdirectories. Hidden entries are ignored.
fn list_units(dir: &Path, directory_category: bool) -> Result<Vec<String>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| agentsync_fs::Error::access(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| agentsync_fs::Error::access(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.path().is_dir();
        if is_dir == directory_category {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
