use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use seeker_core::{
    checkpoint::{CheckpointStore, SqliteCheckpointStore},
    clarify,
    models::{ExecutionState, Plan, PlanKind, Step},
};

fn create_test_environment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test_state.db");
    (temp_dir, db_path)
}

fn suspended_state() -> ExecutionState {
    let plan = Plan {
        kind: PlanKind::Multi,
        rationale: "Folder must be resolved before listing its contents".to_string(),
        step_count: 2,
        steps: vec![
            Step {
                index: 1,
                description: "find the folder named Taxes".to_string(),
                depends_on: None,
            },
            Step {
                index: 2,
                description: "list documents in the resolved folder".to_string(),
                depends_on: Some(1),
            },
        ],
    };
    let mut state = ExecutionState::new("list documents in the Taxes folder", plan);
    let first_step = state.plan.steps[0].clone();
    state.pending_clarification = Some(clarify::build_clarification(
        &first_step,
        json!({"term": {"commonAttributes.name": "Taxes"}}),
        &[
            json!({
                "entityType": "FOLDER",
                "commonAttributes": {"name": "Taxes"},
                "organizationAttributes": {"folderPath": "root/Personal/Taxes"}
            }),
            json!({
                "entityType": "FOLDER",
                "commonAttributes": {"name": "Taxes"},
                "organizationAttributes": {"folderPath": "root/Business/Taxes"}
            }),
        ],
    ));
    state
}

#[test]
fn suspended_state_round_trips_through_sqlite() {
    let (_temp_dir, db_path) = create_test_environment();
    let store = SqliteCheckpointStore::new(&db_path).expect("Failed to open store");

    let state = suspended_state();
    store.save("thread-1", &state).expect("Failed to save");

    let loaded = store
        .load("thread-1")
        .expect("Failed to load")
        .expect("checkpoint missing");
    assert_eq!(loaded, state);
    let pending = loaded.pending_clarification.expect("pending missing");
    assert_eq!(pending.options.len(), 2);
}

#[test]
fn checkpoints_survive_reopening_the_database() {
    let (_temp_dir, db_path) = create_test_environment();

    {
        let store = SqliteCheckpointStore::new(&db_path).expect("Failed to open store");
        store
            .save("thread-1", &suspended_state())
            .expect("Failed to save");
    }

    let reopened = SqliteCheckpointStore::new(&db_path).expect("Failed to reopen store");
    assert!(reopened.load("thread-1").expect("Failed to load").is_some());
}

#[test]
fn save_upserts_by_thread_id() {
    let (_temp_dir, db_path) = create_test_environment();
    let store = SqliteCheckpointStore::new(&db_path).expect("Failed to open store");

    let mut state = suspended_state();
    store.save("thread-1", &state).expect("Failed to save");

    clarify::apply_selection(&mut state, 1).expect("Failed to apply selection");
    store.save("thread-1", &state).expect("Failed to resave");

    let loaded = store
        .load("thread-1")
        .expect("Failed to load")
        .expect("checkpoint missing");
    assert_eq!(loaded.current_step, 2);
    assert!(loaded.pending_clarification.is_none());
    assert_eq!(store.list().expect("Failed to list").len(), 1);
}

#[test]
fn delete_removes_only_the_named_thread() {
    let (_temp_dir, db_path) = create_test_environment();
    let store = SqliteCheckpointStore::new(&db_path).expect("Failed to open store");

    store
        .save("thread-a", &suspended_state())
        .expect("Failed to save");
    store
        .save("thread-b", &suspended_state())
        .expect("Failed to save");

    store.delete("thread-a").expect("Failed to delete");

    assert!(store.load("thread-a").expect("Failed to load").is_none());
    assert!(store.load("thread-b").expect("Failed to load").is_some());
    assert_eq!(store.list().expect("Failed to list"), vec!["thread-b"]);
}

#[test]
fn loading_an_unknown_thread_returns_none() {
    let (_temp_dir, db_path) = create_test_environment();
    let store = SqliteCheckpointStore::new(&db_path).expect("Failed to open store");
    assert!(store.load("missing").expect("Failed to load").is_none());
}
