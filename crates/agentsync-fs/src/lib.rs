//! Integrity layer for agentsync
//!
//! This crate is the leaf of the workspace: it knows nothing about
//! categories, conflicts, or settings documents. It provides:
//!
//! - **Checksums**: canonical `sha256:<hex>` content hashes, the sole
//!   equality test between two files ([`checksum`])
//! - **File records**: on-demand metadata snapshots ([`record`])
//! - **Backups**: lazily created, timestamped pre-overwrite snapshot
//!   directories ([`backup`])
//! - **Verified transfer**: stage-then-rename copies that re-hash the
//!   staged bytes before committing them ([`transfer`])

pub mod backup;
pub mod checksum;
pub mod error;
pub mod io;
pub mod record;
pub mod transfer;

pub use backup::{BackupManager, BackupMetadata, BackupRun};
pub use checksum::{compute_content_checksum, compute_dir_checksum, compute_file_checksum};
pub use error::{Error, Result};
pub use record::FileRecord;
pub use transfer::{CopyOutcome, copy_verified, replace_directory};
