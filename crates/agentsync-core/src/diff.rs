//! Unified diff rendering for conflicting files

use std::fs;
use std::path::Path;

use similar::TextDiff;

use crate::{Error, Result};

/// Number of context lines around each hunk
const CONTEXT_RADIUS: usize = 3;

/// Shown instead of a diff when either side is not decodable text
const BINARY_NOTICE: &str = "(binary content differs; diff not shown)";

/// Render a unified line diff between two files.
///
/// The labels name the two sides (e.g. "project" / "global"). If either
/// file's bytes are not valid UTF-8, a short notice is returned instead of
/// a diff.
///
/// # Errors
///
/// Returns [`Error::Fs`] wrapping an access error if either file cannot be
/// read.
pub fn render_file_diff(
    source_label: &str,
    dest_label: &str,
    source: &Path,
    dest: &Path,
) -> Result<String> {
    let source_bytes =
        fs::read(source).map_err(|e| Error::Fs(agentsync_fs::Error::access(source, e)))?;
    let dest_bytes = fs::read(dest).map_err(|e| Error::Fs(agentsync_fs::Error::access(dest, e)))?;
    Ok(render_diff(
        source_label,
        dest_label,
        &source_bytes,
        &dest_bytes,
    ))
}

/// Render a unified line diff between two in-memory contents.
pub fn render_diff(
    source_label: &str,
    dest_label: &str,
    source: &[u8],
    dest: &[u8],
) -> String {
    let (Ok(source_text), Ok(dest_text)) =
        (std::str::from_utf8(source), std::str::from_utf8(dest))
    else {
        return BINARY_NOTICE.to_string();
    };

    if source_text == dest_text {
        return String::new();
    }

    // Unified diff direction: destination -> source, so "+" lines are what
    // keeping the source would introduce.
    TextDiff::from_lines(dest_text, source_text)
        .unified_diff()
        .context_radius(CONTEXT_RADIUS)
        .header(dest_label, source_label)
        .to_string()
}
