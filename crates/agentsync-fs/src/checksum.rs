//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used as the
//! sole content-equality test between two files. No byte-level inspection
//! happens anywhere else in the workspace.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{Error, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of in-memory content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns [`Error::Access`] if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::access(path, e))?;
    Ok(compute_content_checksum(&content))
}

/// Compute a composite checksum for a directory subtree.
///
/// Hashes the sorted sequence of `(relative path, file checksum)` pairs, so
/// two subtrees get the same checksum exactly when they contain the same
/// files with the same contents. Used for categories whose artifacts are
/// whole directories treated as one unit.
///
/// # Errors
///
/// Returns [`Error::Access`] if the directory or any file in it cannot be
/// read.
pub fn compute_dir_checksum(dir: &Path) -> Result<String> {
    let mut entries = Vec::new();
    collect_file_checksums(dir, dir, &mut entries)?;
    entries.sort();

    let mut hasher = Sha256::new();
    for (rel, checksum) in &entries {
        hasher.update(rel.as_bytes());
        hasher.update([0]);
        hasher.update(checksum.as_bytes());
        hasher.update([0]);
    }
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

fn collect_file_checksums(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, String)>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::access(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::access(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_file_checksums(root, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            out.push((rel, compute_file_checksum(&path)?));
        }
    }
    Ok(())
}
