//! Verified copy operations
//!
//! The only two ways a destination tree is ever mutated: a single-file
//! verified copy, or a whole-subtree replacement for directory units. Both
//! snapshot the destination first (when a backup manager is supplied),
//! stage through [`crate::io::stage_verified`], and honor dry-run by doing
//! all the read and hash work while suppressing every side effect.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::backup::BackupManager;
use crate::checksum::{compute_content_checksum, compute_dir_checksum};
use crate::io::stage_verified;
use crate::{Error, Result};

/// What a transfer did, or would have done under dry-run.
#[derive(Debug, Clone)]
pub struct CopyOutcome {
    /// Relative path of the unit
    pub path: String,
    /// Source content checksum
    pub checksum: String,
    /// Whether the destination existed before the transfer
    pub overwrote: bool,
    /// Whether a backup snapshot was taken
    pub backed_up: bool,
    /// Whether the destination was actually written (false under dry-run)
    pub written: bool,
}

/// Copy the file `rel` from `src_root` to `dest_root` with verification.
///
/// If the destination exists and `backup` is supplied, it is snapshotted
/// into the run's backup directory first. The source's permission bits are
/// preserved, missing parent directories are created, and the staged copy
/// is re-hashed before it replaces the destination.
///
/// # Errors
///
/// [`Error::Access`] if the source cannot be read; [`Error::Integrity`] if
/// the staged copy does not hash to the source checksum.
pub fn copy_verified(
    src_root: &Path,
    dest_root: &Path,
    rel: &str,
    backup: Option<&mut BackupManager>,
    dry_run: bool,
) -> Result<CopyOutcome> {
    let source = src_root.join(rel);
    let dest = dest_root.join(rel);

    let content = fs::read(&source).map_err(|e| Error::access(&source, e))?;
    let checksum = compute_content_checksum(&content);
    let permissions = fs::metadata(&source)
        .map_err(|e| Error::access(&source, e))?
        .permissions();
    let overwrote = dest.exists();

    if dry_run {
        debug!(path = %rel, "dry-run: would copy file");
        return Ok(CopyOutcome {
            path: rel.replace('\\', "/"),
            checksum,
            overwrote,
            backed_up: false,
            written: false,
        });
    }

    let mut backed_up = false;
    if overwrote && let Some(manager) = backup {
        manager.snapshot_file(rel)?;
        backed_up = true;
    }

    stage_verified(&dest, &content, &checksum, Some(permissions))?;
    debug!(path = %rel, checksum = %checksum, "copied file");

    Ok(CopyOutcome {
        path: rel.replace('\\', "/"),
        checksum,
        overwrote,
        backed_up,
        written: true,
    })
}

/// Replace the directory unit `rel` in `dest_root` with the subtree from
/// `src_root`.
///
/// The destination subtree is snapshotted as a whole, deleted, and
/// recreated file by file with per-file verification. Used for categories
/// whose artifacts are entire subdirectories treated as one unit.
pub fn replace_directory(
    src_root: &Path,
    dest_root: &Path,
    rel: &str,
    backup: Option<&mut BackupManager>,
    dry_run: bool,
) -> Result<CopyOutcome> {
    let source = src_root.join(rel);
    let dest = dest_root.join(rel);

    if !source.is_dir() {
        return Err(Error::access(
            &source,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let checksum = compute_dir_checksum(&source)?;
    let overwrote = dest.exists();

    if dry_run {
        debug!(path = %rel, "dry-run: would replace directory");
        return Ok(CopyOutcome {
            path: rel.replace('\\', "/"),
            checksum,
            overwrote,
            backed_up: false,
            written: false,
        });
    }

    let mut backed_up = false;
    if overwrote {
        if let Some(manager) = backup {
            manager.snapshot_dir(rel)?;
            backed_up = true;
        }
        fs::remove_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
    }

    copy_tree_verified(&source, &dest)?;
    debug!(path = %rel, checksum = %checksum, "replaced directory");

    Ok(CopyOutcome {
        path: rel.replace('\\', "/"),
        checksum,
        overwrote,
        backed_up,
        written: true,
    })
}

fn copy_tree_verified(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    let entries = fs::read_dir(source).map_err(|e| Error::access(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::access(source, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if from.is_dir() {
            copy_tree_verified(&from, &to)?;
        } else {
            let content = fs::read(&from).map_err(|e| Error::access(&from, e))?;
            let checksum = compute_content_checksum(&content);
            let permissions = fs::metadata(&from)
                .map_err(|e| Error::access(&from, e))?
                .permissions();
            stage_verified(&to, &content, &checksum, Some(permissions))?;
        }
    }
    Ok(())
}
