//! End-to-end sync flows across the fs and core layers
//!
//! These tests drive the orchestrator against real temp directories and
//! verify the on-disk outcome: copied content, backups, and the aggregate
//! result, in both directions.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;
use tempfile::TempDir;

use agentsync_core::{
    Category, ConflictAction, ConflictContext, ConflictPrompt, ConflictResolver, Direction,
    MemoryReporter, NullReporter, Reporter, SyncEngine, SyncOptions,
};
use agentsync_fs::{BackupManager, compute_file_checksum};

const OLD_MTIME: i64 = 1_700_000_000;
const NEW_MTIME: i64 = 1_700_000_100;

fn setup_trees() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project/.agent");
    let global = temp.path().join("home/.agent");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&global).unwrap();
    (temp, project, global)
}

fn write_file(root: &Path, rel: &str, content: &str, mtime: i64) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

fn forced_engine(project: &Path, global: &Path) -> SyncEngine {
    let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
    SyncEngine::new(
        project,
        global,
        ConflictResolver::forced(Arc::clone(&reporter)),
        reporter,
    )
}

/// Prompt that replays a fixed script of actions and panics when the
/// engine consults it more often than expected.
struct ScriptedPrompt {
    responses: VecDeque<ConflictAction>,
}

impl ScriptedPrompt {
    fn new(responses: impl IntoIterator<Item = ConflictAction>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
        }
    }
}

impl ConflictPrompt for ScriptedPrompt {
    fn choose(&mut self, ctx: &ConflictContext<'_>) -> agentsync_core::Result<ConflictAction> {
        match self.responses.pop_front() {
            Some(action) => Ok(action),
            None => panic!("prompt consulted unexpectedly for {}", ctx.relative_path),
        }
    }
}

#[test]
fn push_copies_new_units_across_categories() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/deploy.md", "# deploy\n", OLD_MTIME);
    write_file(&project, "agents/reviewer.md", "reviewer\n", OLD_MTIME);
    write_file(&project, "skills/search/SKILL.md", "# search\n", OLD_MTIME);
    write_file(&project, "skills/search/query.py", "print()\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(Direction::Push, &Category::ALL, &SyncOptions::default())
        .unwrap();

    assert_eq!(result.summary.copied, 3);
    assert_eq!(result.summary.errors, 0);
    assert_eq!(
        fs::read_to_string(global.join("commands/deploy.md")).unwrap(),
        "# deploy\n"
    );
    assert_eq!(
        compute_file_checksum(&global.join("skills/search/query.py")).unwrap(),
        compute_file_checksum(&project.join("skills/search/query.py")).unwrap()
    );
    // nothing was overwritten, so no backup run was created
    assert!(BackupManager::list_runs(&global).unwrap().is_empty());
}

#[test]
fn second_run_is_idempotent() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/deploy.md", "# deploy\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let options = SyncOptions::default();
    engine
        .sync(Direction::Push, &Category::ALL, &options)
        .unwrap();
    let second = engine
        .sync(Direction::Push, &Category::ALL, &options)
        .unwrap();

    assert_eq!(second.summary.copied, 0);
    assert_eq!(second.summary.skipped, 1);
}

#[test]
fn pull_copies_from_global_to_project() {
    let (_temp, project, global) = setup_trees();
    write_file(&global, "agents/planner.md", "planner\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(Direction::Pull, &Category::ALL, &SyncOptions::default())
        .unwrap();

    assert_eq!(result.files_copied, vec!["agents/planner.md"]);
    assert!(project.join("agents/planner.md").exists());
}

#[test]
fn forced_conflict_backs_up_before_overwriting() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/deploy.md", "new content\n", NEW_MTIME);
    write_file(&global, "commands/deploy.md", "old content\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(Direction::Push, &Category::ALL, &SyncOptions::default())
        .unwrap();

    assert_eq!(result.summary.conflicts, 1);
    assert_eq!(
        fs::read_to_string(global.join("commands/deploy.md")).unwrap(),
        "new content\n"
    );

    let runs = BackupManager::list_runs(&global).unwrap();
    assert_eq!(runs.len(), 1);
    let backed_up = runs[0].path.join("commands/deploy.md");
    assert_eq!(fs::read_to_string(backed_up).unwrap(), "old content\n");
    let metadata = runs[0].metadata.as_ref().unwrap();
    assert_eq!(metadata.entries, vec!["commands/deploy.md"]);
}

#[test]
fn forced_conflict_keeps_newer_destination() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/deploy.md", "stale\n", OLD_MTIME);
    write_file(&global, "commands/deploy.md", "fresh\n", NEW_MTIME);

    let mut engine = forced_engine(&project, &global);
    engine
        .sync(Direction::Push, &Category::ALL, &SyncOptions::default())
        .unwrap();

    assert_eq!(
        fs::read_to_string(global.join("commands/deploy.md")).unwrap(),
        "fresh\n"
    );
    assert!(BackupManager::list_runs(&global).unwrap().is_empty());
}

#[test]
fn interactive_apply_all_covers_remaining_conflicts() {
    let (_temp, project, global) = setup_trees();
    for name in ["a.md", "b.md", "c.md"] {
        write_file(&project, &format!("commands/{name}"), "ours\n", NEW_MTIME);
        write_file(&global, &format!("commands/{name}"), "theirs\n", OLD_MTIME);
    }

    let reporter: Arc<dyn Reporter> = Arc::new(MemoryReporter::new());
    let resolver = ConflictResolver::new(
        Box::new(ScriptedPrompt::new([ConflictAction::ApplyAllSource])),
        Arc::clone(&reporter),
    );
    let mut engine = SyncEngine::new(&project, &global, resolver, reporter);
    let result = engine
        .sync(Direction::Push, &Category::ALL, &SyncOptions::default())
        .unwrap();

    assert_eq!(result.summary.conflicts, 3);
    for name in ["a.md", "b.md", "c.md"] {
        assert_eq!(
            fs::read_to_string(global.join("commands").join(name)).unwrap(),
            "ours\n"
        );
    }
}

#[test]
fn skills_directory_replaced_as_one_unit() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "skills/search/SKILL.md", "v2\n", NEW_MTIME);
    write_file(&global, "skills/search/SKILL.md", "v1\n", OLD_MTIME);
    write_file(&global, "skills/search/stale.py", "old helper\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(
            Direction::Push,
            &[Category::Skills],
            &SyncOptions::default(),
        )
        .unwrap();

    assert_eq!(result.summary.conflicts, 1);
    assert_eq!(
        fs::read_to_string(global.join("skills/search/SKILL.md")).unwrap(),
        "v2\n"
    );
    // the stale file is gone from the tree but preserved in the backup
    assert!(!global.join("skills/search/stale.py").exists());
    let runs = BackupManager::list_runs(&global).unwrap();
    assert!(runs[0].path.join("skills/search/stale.py").exists());
}

#[test]
fn dry_run_leaves_both_trees_untouched() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/new.md", "new\n", OLD_MTIME);
    write_file(&project, "commands/conflict.md", "ours\n", NEW_MTIME);
    write_file(&global, "commands/conflict.md", "theirs\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let options = SyncOptions {
        force: true,
        dry_run: true,
    };
    let result = engine
        .sync(Direction::Push, &Category::ALL, &options)
        .unwrap();

    assert_eq!(result.summary.copied, 1);
    assert_eq!(result.summary.conflicts, 1);
    assert!(!global.join("commands/new.md").exists());
    assert_eq!(
        fs::read_to_string(global.join("commands/conflict.md")).unwrap(),
        "theirs\n"
    );
    assert!(!global.join(".backups").exists());
}

#[test]
fn default_category_set_excludes_prompts() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "prompts/draft.md", "draft\n", OLD_MTIME);
    write_file(&project, "commands/run.md", "run\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(
            Direction::Push,
            &Category::default_set(),
            &SyncOptions::default(),
        )
        .unwrap();

    assert_eq!(result.files_copied, vec!["commands/run.md"]);
    assert!(!global.join("prompts/draft.md").exists());

    let explicit = engine
        .sync(
            Direction::Push,
            &[Category::Prompts],
            &SyncOptions::default(),
        )
        .unwrap();
    assert_eq!(explicit.files_copied, vec!["prompts/draft.md"]);
}

#[test]
fn result_serializes_for_scripting() {
    let (_temp, project, global) = setup_trees();
    write_file(&project, "commands/deploy.md", "ours\n", NEW_MTIME);
    write_file(&global, "commands/deploy.md", "theirs\n", OLD_MTIME);

    let mut engine = forced_engine(&project, &global);
    let result = engine
        .sync(Direction::Push, &Category::ALL, &SyncOptions::default())
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value["conflicts_resolved"]["commands/deploy.md"],
        "keep_source"
    );
    assert_eq!(value["summary"]["total"], 1);
}
