//! Staged atomic writes
//!
//! All destination mutations go through a stage-then-rename sequence: the
//! payload is written to a temp file in the destination's own directory
//! (same filesystem, so the final rename is atomic), locked, flushed, and
//! re-hashed from disk before it replaces the destination. An interrupted
//! process can leave a stale temp file behind but never a corrupt
//! destination.

use std::fs::{self, OpenOptions, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::checksum::compute_file_checksum;
use crate::{Error, Result};

/// Temp sibling path for staging writes to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Write `content` to `dest` atomically, verifying the staged bytes.
///
/// Creates missing parent directories. When `mode` is given, the staged
/// file receives those permission bits before the rename. The staged file
/// is re-read and hashed from disk; on mismatch the temp file is removed
/// and [`Error::Integrity`] is returned without touching `dest`.
pub fn stage_verified(
    dest: &Path,
    content: &[u8],
    expected_checksum: &str,
    mode: Option<Permissions>,
) -> Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_sibling(dest);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: dest.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: dest.to_path_buf(),
    })?;
    drop(temp_file);

    if let Some(permissions) = mode {
        fs::set_permissions(&temp_path, permissions).map_err(|e| Error::io(&temp_path, e))?;
    }

    let actual = compute_file_checksum(&temp_path)?;
    if actual != expected_checksum {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Integrity {
            path: dest.to_path_buf(),
            expected: expected_checksum.to_string(),
            actual,
        });
    }

    fs::rename(&temp_path, dest).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

/// Write `content` to `dest` atomically without hash verification.
///
/// Used for bookkeeping files (backup metadata) where the payload was
/// produced in memory and verification adds nothing.
pub fn write_atomic(dest: &Path, content: &[u8]) -> Result<()> {
    let checksum = crate::checksum::compute_content_checksum(content);
    stage_verified(dest, content, &checksum, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_content_checksum;

    #[test]
    fn stage_verified_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.md");
        let checksum = compute_content_checksum(b"payload");

        stage_verified(&dest, b"payload", &checksum, None).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
    }

    #[test]
    fn stage_verified_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("deep/nested/out.md");
        let checksum = compute_content_checksum(b"payload");

        stage_verified(&dest, b"payload", &checksum, None).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn stage_verified_rejects_wrong_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.md");
        fs::write(&dest, "original").unwrap();

        let result = stage_verified(&dest, b"payload", "sha256:bogus", None);
        assert!(matches!(result, Err(Error::Integrity { .. })));
        // Destination untouched, temp file cleaned up
        assert_eq!(fs::read_to_string(&dest).unwrap(), "original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("meta.toml");
        fs::write(&dest, "old").unwrap();

        write_atomic(&dest, b"new").unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn stage_verified_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("hook.sh");
        let checksum = compute_content_checksum(b"#!/bin/sh\n");

        stage_verified(
            &dest,
            b"#!/bin/sh\n",
            &checksum,
            Some(Permissions::from_mode(0o755)),
        )
        .unwrap();
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
