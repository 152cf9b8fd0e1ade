//! Settings comparison over real files on disk

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use agentsync_core::settings::SETTINGS_FILE;
use agentsync_core::{HookDifference, PermissionDifference, analyze, load_settings};

fn setup_trees() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project/.agent");
    let global = temp.path().join("home/.agent");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&global).unwrap();
    (temp, project, global)
}

fn write_settings(root: &Path, content: &str) {
    fs::write(root.join(SETTINGS_FILE), content).unwrap();
}

#[test]
fn missing_documents_compare_as_in_sync() {
    let (_temp, project, global) = setup_trees();

    let source = load_settings(&project.join(SETTINGS_FILE)).unwrap().unwrap();
    let dest = load_settings(&global.join(SETTINGS_FILE)).unwrap().unwrap();
    let analysis = analyze(&source, &dest);

    assert!(!analysis.has_differences());
    assert!(analysis.recommendations.is_empty());
}

#[test]
fn allow_rule_unique_to_project_is_flagged() {
    let (_temp, project, global) = setup_trees();
    write_settings(
        &project,
        r#"{"permissions": {"allow": ["Bash(ls:*)", "mcp__test"]}}"#,
    );
    write_settings(&global, r#"{"permissions": {"allow": ["Bash(ls:*)"]}}"#);

    let source = load_settings(&project.join(SETTINGS_FILE)).unwrap().unwrap();
    let dest = load_settings(&global.join(SETTINGS_FILE)).unwrap().unwrap();
    let analysis = analyze(&source, &dest);

    assert_eq!(
        analysis.permission_differences,
        vec![PermissionDifference::AllowUniqueToSource {
            permissions: vec!["mcp__test".to_string()],
        }]
    );
    assert!(!analysis.recommendations.is_empty());
}

#[test]
fn hook_entry_count_mismatch_is_flagged() {
    let (_temp, project, global) = setup_trees();
    write_settings(
        &project,
        r#"{
            "hooks": {
                "PreToolUse": [
                    {"matcher": "Bash", "hooks": [
                        {"type": "command", "command": "./check.sh"},
                        {"type": "command", "command": "./audit.sh"}
                    ]}
                ]
            }
        }"#,
    );
    write_settings(
        &global,
        r#"{
            "hooks": {
                "PreToolUse": [
                    {"matcher": "Bash", "hooks": [
                        {"type": "command", "command": "./check.sh"}
                    ]}
                ]
            }
        }"#,
    );

    let source = load_settings(&project.join(SETTINGS_FILE)).unwrap().unwrap();
    let dest = load_settings(&global.join(SETTINGS_FILE)).unwrap().unwrap();
    let analysis = analyze(&source, &dest);

    assert!(analysis.hook_differences.iter().any(|d| matches!(
        d,
        HookDifference::HookCountMismatch {
            hook_type,
            source_count: 2,
            dest_count: 1,
        } if hook_type == "PreToolUse"
    )));
}

#[test]
fn malformed_document_yields_none() {
    let (_temp, project, _global) = setup_trees();
    write_settings(&project, "{not json");

    let loaded = load_settings(&project.join(SETTINGS_FILE)).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn analysis_serializes_with_tagged_differences() {
    let (_temp, project, global) = setup_trees();
    write_settings(&project, r#"{"enabledPlugins": {"linter": true}}"#);
    write_settings(&global, r#"{"enabledPlugins": {"linter": false}}"#);

    let source = load_settings(&project.join(SETTINGS_FILE)).unwrap().unwrap();
    let dest = load_settings(&global.join(SETTINGS_FILE)).unwrap().unwrap();
    let analysis = analyze(&source, &dest);

    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["plugin_differences"][0]["type"], "enabled_mismatch");
    assert_eq!(value["plugin_differences"][0]["plugin"], "linter");
}
