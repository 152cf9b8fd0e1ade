//! Core reconciliation layer for agentsync
//!
//! This crate coordinates the integrity layer into the three subsystems
//! that make up the synchronizer:
//!
//! - **Conflict resolution** ([`conflict`]): a small state machine that
//!   decides what to do with units that exist on both sides with differing
//!   content, interactively, in batch, or forced by file recency
//! - **Settings analysis** ([`settings`]): structured comparison of the two
//!   trees' `settings.json` documents (hooks, permissions, plugins)
//! - **Sync orchestration** ([`sync`]): enumerates categories and units,
//!   classifies each pair as new / identical / conflicting, applies the
//!   chosen action, and aggregates one [`sync::SyncResult`] per run
//!
//! # Architecture
//!
//! ```text
//!        CLI
//!         |
//!   agentsync-core
//!         |
//!   agentsync-fs
//! ```
//!
//! User-facing output goes through the injected [`Reporter`] trait; there
//! is no module-level reporter or other global mutable state.

pub mod category;
pub mod conflict;
pub mod diff;
pub mod error;
pub mod reporter;
pub mod settings;
pub mod sync;

pub use category::Category;
pub use conflict::{
    ConflictAction, ConflictContext, ConflictPrompt, ConflictResolver, Resolution,
};
pub use error::{Error, Result};
pub use reporter::{MemoryReporter, NullReporter, Reporter};
pub use settings::{
    HookDifference, PermissionDifference, PluginDifference, SettingsAnalysis, SettingsDocument,
    analyze, load_settings,
};
pub use sync::{Direction, SyncEngine, SyncOptions, SyncResult, SyncSummary};
