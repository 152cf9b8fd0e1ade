//! Pre-overwrite backup snapshots
//!
//! Backups live under `<dest>/.backups/<run-timestamp>/`, one directory per
//! run, created lazily on the first snapshot. Snapshots keep their relative
//! paths inside the run directory, and a `metadata.toml` records when the
//! run started and what was captured. Runs are never pruned; restoring from
//! one is a manual, out-of-band operation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::write_atomic;
use crate::{Error, Result};

/// Directory under the destination root that holds backup runs
pub const BACKUPS_DIR: &str = ".backups";

const METADATA_FILE: &str = "metadata.toml";

/// Metadata for one backup run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// When the run directory was created
    pub created: DateTime<Utc>,
    /// Relative paths snapshotted during the run
    pub entries: Vec<String>,
}

/// A previously written backup run, as found on disk
#[derive(Debug, Clone)]
pub struct BackupRun {
    /// Run directory name (the timestamp)
    pub name: String,
    /// Absolute path to the run directory
    pub path: PathBuf,
    /// Parsed metadata, if the metadata file is present and valid
    pub metadata: Option<BackupMetadata>,
}

/// Manages the backup run for one sync invocation.
///
/// The run directory is created on the first snapshot, so a run that
/// overwrites nothing leaves no backup directory behind.
pub struct BackupManager {
    dest_root: PathBuf,
    run_dir: Option<PathBuf>,
    metadata: BackupMetadata,
}

impl BackupManager {
    /// Create a manager for the given destination tree root.
    pub fn new(dest_root: &Path) -> Self {
        Self {
            dest_root: dest_root.to_path_buf(),
            run_dir: None,
            metadata: BackupMetadata {
                created: Utc::now(),
                entries: Vec::new(),
            },
        }
    }

    /// The run directory, if any snapshot has been taken.
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    /// Snapshot the destination file at `rel` into the run directory.
    ///
    /// Returns the snapshot path. Creates the run directory on first use.
    pub fn snapshot_file(&mut self, rel: &str) -> Result<PathBuf> {
        let source = self.dest_root.join(rel);
        let run_dir = self.ensure_run_dir()?;
        let snapshot = run_dir.join(rel);

        if let Some(parent) = snapshot.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(&source, &snapshot).map_err(|e| Error::access(&source, e))?;

        debug!(path = %rel, "snapshotted file before overwrite");
        self.record_entry(&run_dir, rel)?;
        Ok(snapshot)
    }

    /// Snapshot the destination subtree at `rel` into the run directory.
    pub fn snapshot_dir(&mut self, rel: &str) -> Result<PathBuf> {
        let source = self.dest_root.join(rel);
        let run_dir = self.ensure_run_dir()?;
        let snapshot = run_dir.join(rel);

        copy_tree(&source, &snapshot)?;

        debug!(path = %rel, "snapshotted directory before replacement");
        self.record_entry(&run_dir, rel)?;
        Ok(snapshot)
    }

    /// List all backup runs under `dest_root`, oldest first.
    pub fn list_runs(dest_root: &Path) -> Result<Vec<BackupRun>> {
        let backups_dir = dest_root.join(BACKUPS_DIR);
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        let entries = fs::read_dir(&backups_dir).map_err(|e| Error::access(&backups_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::access(&backups_dir, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = fs::read_to_string(path.join(METADATA_FILE))
                .ok()
                .and_then(|content| toml::from_str(&content).ok());
            runs.push(BackupRun {
                name,
                path,
                metadata,
            });
        }
        runs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(runs)
    }

    fn ensure_run_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.run_dir {
            return Ok(dir.clone());
        }

        let backups_dir = self.dest_root.join(BACKUPS_DIR);
        let stamp = self.metadata.created.format("%Y%m%d-%H%M%S").to_string();

        // Two runs within the same second get distinct directories.
        let mut candidate = backups_dir.join(&stamp);
        let mut suffix = 1;
        while candidate.exists() {
            suffix += 1;
            candidate = backups_dir.join(format!("{stamp}-{suffix}"));
        }

        fs::create_dir_all(&candidate).map_err(|e| Error::io(&candidate, e))?;
        debug!(dir = %candidate.display(), "created backup run directory");
        self.run_dir = Some(candidate.clone());
        Ok(candidate)
    }

    fn record_entry(&mut self, run_dir: &Path, rel: &str) -> Result<()> {
        self.metadata.entries.push(rel.replace('\\', "/"));
        let content = toml::to_string_pretty(&self.metadata)?;
        write_atomic(&run_dir.join(METADATA_FILE), content.as_bytes())
    }
}

/// Recursively copy `source` to `dest`, creating `dest`.
pub(crate) fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    let entries = fs::read_dir(source).map_err(|e| Error::access(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::access(source, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::access(&from, e))?;
        }
    }
    Ok(())
}
