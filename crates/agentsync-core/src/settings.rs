//! Structured comparison of settings documents
//!
//! Each tree root may carry a `settings.json` holding permission rules,
//! plugin enabled-state, and hook definitions. The analyzer compares two
//! such documents field by field and produces typed difference records
//! plus a derived list of recommendations. It runs independently of the
//! sync loop and only ever reads the documents.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// File name of the settings document under a tree root
pub const SETTINGS_FILE: &str = "settings.json";

/// Parsed settings document. Unknown fields are tolerated; every field
/// defaults to empty so a missing document behaves like `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDocument {
    pub permissions: Permissions,
    pub enabled_plugins: BTreeMap<String, bool>,
    pub hooks: BTreeMap<String, Vec<HookMatcher>>,
}

/// Permission allow/deny rule lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

/// One matcher group under a hook event type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookMatcher {
    pub matcher: String,
    pub hooks: Vec<HookEntry>,
}

/// One hook entry: a command with an optional timeout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
    pub timeout: Option<u64>,
}

/// A difference in hook configuration between the two documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookDifference {
    HookCountMismatch {
        hook_type: String,
        source_count: usize,
        dest_count: usize,
    },
    HookInSourceOnly {
        hook_type: String,
        path: String,
    },
    HookInDestOnly {
        hook_type: String,
        path: String,
    },
}

/// A difference in permission rule lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PermissionDifference {
    AllowUniqueToSource {
        permissions: Vec<String>,
    },
    AllowUniqueToDest {
        permissions: Vec<String>,
    },
    /// Deny-list changes are security-sensitive; they are flagged
    /// wholesale, never broken down per entry.
    DenyListsDiffer {
        source_deny: Vec<String>,
        dest_deny: Vec<String>,
    },
}

/// A plugin enabled on one side and disabled on the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginDifference {
    EnabledMismatch {
        plugin: String,
        source_enabled: bool,
        dest_enabled: bool,
    },
}

/// Result of analyzing two settings documents
#[derive(Debug, Clone, Serialize)]
pub struct SettingsAnalysis {
    pub hook_differences: Vec<HookDifference>,
    pub permission_differences: Vec<PermissionDifference>,
    pub plugin_differences: Vec<PluginDifference>,
    pub source: SettingsDocument,
    pub dest: SettingsDocument,
    pub recommendations: Vec<String>,
}

impl SettingsAnalysis {
    /// True iff any of the three difference collections is non-empty.
    pub fn has_differences(&self) -> bool {
        !self.hook_differences.is_empty()
            || !self.permission_differences.is_empty()
            || !self.plugin_differences.is_empty()
    }
}

/// Load a settings document from a tree root's `settings.json`.
///
/// A missing file is an empty document. A malformed document returns
/// `Ok(None)` after logging; the caller is expected to skip the whole
/// comparison rather than analyze a partial pair.
///
/// # Errors
///
/// Only genuine read failures (permissions, I/O) are errors.
pub fn load_settings(path: &Path) -> Result<Option<SettingsDocument>> {
    if !path.exists() {
        return Ok(Some(SettingsDocument::default()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| agentsync_fs::Error::access(path, e))?;
    match serde_json::from_str(&content) {
        Ok(document) => Ok(Some(document)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed settings document; skipping analysis");
            Ok(None)
        }
    }
}

/// Compare two settings documents and derive recommendations.
///
/// Pure and deterministic: collections are set-compared with sorted
/// output, and recommendations are a function of the differences alone.
pub fn analyze(source: &SettingsDocument, dest: &SettingsDocument) -> SettingsAnalysis {
    let hook_differences = compare_hooks(source, dest);
    let permission_differences = compare_permissions(&source.permissions, &dest.permissions);
    let plugin_differences = compare_plugins(&source.enabled_plugins, &dest.enabled_plugins);
    let recommendations = recommend(
        &hook_differences,
        &permission_differences,
        &plugin_differences,
    );

    SettingsAnalysis {
        hook_differences,
        permission_differences,
        plugin_differences,
        source: source.clone(),
        dest: dest.clone(),
        recommendations,
    }
}

fn hook_entry_count(matchers: &[HookMatcher]) -> usize {
    matchers.iter().map(|m| m.hooks.len()).sum()
}

fn hook_command_paths(matchers: &[HookMatcher]) -> BTreeSet<String> {
    matchers
        .iter()
        .flat_map(|m| m.hooks.iter())
        .filter(|h| !h.command.is_empty())
        .map(|h| h.command.clone())
        .collect()
}

fn compare_hooks(source: &SettingsDocument, dest: &SettingsDocument) -> Vec<HookDifference> {
    let mut differences = Vec::new();

    let event_types: BTreeSet<&String> =
        source.hooks.keys().chain(dest.hooks.keys()).collect();
    let empty: Vec<HookMatcher> = Vec::new();

    for event_type in event_types {
        let source_matchers = source.hooks.get(event_type).unwrap_or(&empty);
        let dest_matchers = dest.hooks.get(event_type).unwrap_or(&empty);

        let source_count = hook_entry_count(source_matchers);
        let dest_count = hook_entry_count(dest_matchers);
        if source_count != dest_count {
            differences.push(HookDifference::HookCountMismatch {
                hook_type: event_type.clone(),
                source_count,
                dest_count,
            });
        }

        // Command-path comparison is independent of counts and
        // order-insensitive.
        let source_paths = hook_command_paths(source_matchers);
        let dest_paths = hook_command_paths(dest_matchers);
        for path in source_paths.difference(&dest_paths) {
            differences.push(HookDifference::HookInSourceOnly {
                hook_type: event_type.clone(),
                path: path.clone(),
            });
        }
        for path in dest_paths.difference(&source_paths) {
            differences.push(HookDifference::HookInDestOnly {
                hook_type: event_type.clone(),
                path: path.clone(),
            });
        }
    }

    differences
}

fn compare_permissions(source: &Permissions, dest: &Permissions) -> Vec<PermissionDifference> {
    let mut differences = Vec::new();

    let source_allow: BTreeSet<&String> = source.allow.iter().collect();
    let dest_allow: BTreeSet<&String> = dest.allow.iter().collect();

    let unique_to_source: Vec<String> = source_allow
        .difference(&dest_allow)
        .map(|s| (*s).clone())
        .collect();
    if !unique_to_source.is_empty() {
        differences.push(PermissionDifference::AllowUniqueToSource {
            permissions: unique_to_source,
        });
    }

    let unique_to_dest: Vec<String> = dest_allow
        .difference(&source_allow)
        .map(|s| (*s).clone())
        .collect();
    if !unique_to_dest.is_empty() {
        differences.push(PermissionDifference::AllowUniqueToDest {
            permissions: unique_to_dest,
        });
    }

    let source_deny: BTreeSet<&String> = source.deny.iter().collect();
    let dest_deny: BTreeSet<&String> = dest.deny.iter().collect();
    if source_deny != dest_deny {
        let mut source_sorted: Vec<String> = source.deny.clone();
        let mut dest_sorted: Vec<String> = dest.deny.clone();
        source_sorted.sort();
        source_sorted.dedup();
        dest_sorted.sort();
        dest_sorted.dedup();
        differences.push(PermissionDifference::DenyListsDiffer {
            source_deny: source_sorted,
            dest_deny: dest_sorted,
        });
    }

    differences
}

fn compare_plugins(
    source: &BTreeMap<String, bool>,
    dest: &BTreeMap<String, bool>,
) -> Vec<PluginDifference> {
    let mut differences = Vec::new();
    let plugins: BTreeSet<&String> = source.keys().chain(dest.keys()).collect();

    for plugin in plugins {
        // A plugin present on only one side is not itself a difference;
        // only differing enabled values are.
        if let (Some(&source_enabled), Some(&dest_enabled)) =
            (source.get(plugin), dest.get(plugin))
            && source_enabled != dest_enabled
        {
            differences.push(PluginDifference::EnabledMismatch {
                plugin: plugin.clone(),
                source_enabled,
                dest_enabled,
            });
        }
    }

    differences
}

fn recommend(
    hooks: &[HookDifference],
    permissions: &[PermissionDifference],
    plugins: &[PluginDifference],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let affected_types: BTreeSet<&String> = hooks
        .iter()
        .map(|d| match d {
            HookDifference::HookCountMismatch { hook_type, .. }
            | HookDifference::HookInSourceOnly { hook_type, .. }
            | HookDifference::HookInDestOnly { hook_type, .. } => hook_type,
        })
        .collect();
    for hook_type in affected_types {
        recommendations.push(format!(
            "Standardize {hook_type} hooks across the project and global trees"
        ));
    }

    for difference in permissions {
        match difference {
            PermissionDifference::AllowUniqueToSource { permissions } => {
                recommendations.push(format!(
                    "{} permission(s) unique to the source tree; consider promoting them to the shared tier",
                    permissions.len()
                ));
            }
            PermissionDifference::AllowUniqueToDest { permissions } => {
                recommendations.push(format!(
                    "{} permission(s) unique to the destination tree; consider promoting them to the shared tier",
                    permissions.len()
                ));
            }
            PermissionDifference::DenyListsDiffer { .. } => {
                recommendations
                    .push("Deny lists differ; verify the difference is intentional".to_string());
            }
        }
    }

    for difference in plugins {
        let PluginDifference::EnabledMismatch { plugin, .. } = difference;
        recommendations.push(format!(
            "Plugin '{plugin}' has differing enabled state; align both trees"
        ));
    }

    recommendations
}
