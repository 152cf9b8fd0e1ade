//! On-demand file metadata records

use std::path::Path;
use std::time::SystemTime;

use crate::checksum::{compute_dir_checksum, compute_file_checksum};
use crate::{Error, Result};

/// A snapshot of one unit's identity: relative path, content checksum,
/// byte size, and modification time.
///
/// Records are computed fresh on every capture and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to its tree root, forward slashes
    pub path: String,
    /// Canonical `sha256:<hex>` content checksum
    pub checksum: String,
    /// Size in bytes (sum of file sizes for directory units)
    pub size: u64,
    /// Modification time (newest contained file for directory units)
    pub modified: SystemTime,
}

impl FileRecord {
    /// Capture a record for the file at `root`/`rel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Access`] if the file cannot be read or stat'd.
    pub fn capture(root: &Path, rel: &str) -> Result<Self> {
        let path = root.join(rel);
        let metadata = std::fs::metadata(&path).map_err(|e| Error::access(&path, e))?;
        Ok(Self {
            path: rel.replace('\\', "/"),
            checksum: compute_file_checksum(&path)?,
            size: metadata.len(),
            modified: metadata
                .modified()
                .map_err(|e| Error::access(&path, e))?,
        })
    }

    /// Capture a record for the directory unit at `root`/`rel`.
    ///
    /// The checksum is the composite subtree checksum, the size is the sum
    /// of all contained file sizes, and the modification time is the newest
    /// contained file's mtime (falling back to the directory's own mtime
    /// when the subtree is empty).
    pub fn capture_dir(root: &Path, rel: &str) -> Result<Self> {
        let path = root.join(rel);
        let metadata = std::fs::metadata(&path).map_err(|e| Error::access(&path, e))?;
        let mut size = 0u64;
        let mut modified = metadata
            .modified()
            .map_err(|e| Error::access(&path, e))?;
        accumulate_stats(&path, &mut size, &mut modified)?;
        Ok(Self {
            path: rel.replace('\\', "/"),
            checksum: compute_dir_checksum(&path)?,
            size,
            modified,
        })
    }
}

fn accumulate_stats(dir: &Path, size: &mut u64, modified: &mut SystemTime) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::access(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::access(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            accumulate_stats(&path, size, modified)?;
        } else {
            let metadata = std::fs::metadata(&path).map_err(|e| Error::access(&path, e))?;
            *size += metadata.len();
            if let Ok(mtime) = metadata.modified()
                && mtime > *modified
            {
                *modified = mtime;
            }
        }
    }
    Ok(())
}
