//! Checkpoint persistence for suspended runs.
//!
//! A suspended run is nothing but its serialized [`ExecutionState`] keyed by
//! thread id; resuming reloads that state and continues. The engine only
//! depends on the [`CheckpointStore`] trait.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{error::Result, models::ExecutionState};

pub mod sqlite;

pub use sqlite::SqliteCheckpointStore;

/// Persistence for suspended execution states, keyed by thread id.
pub trait CheckpointStore: Send + Sync {
    /// Saves the state for a thread, replacing any previous checkpoint.
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()>;

    /// Loads a thread's checkpoint, or `None` if no run is suspended there.
    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>>;

    /// Removes a thread's checkpoint. Unknown thread ids are not an error.
    fn delete(&self, thread_id: &str) -> Result<()>;

    /// Lists the thread ids with a suspended run, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// In-process store for tests and one-shot invocations.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    states: Mutex<HashMap<String, ExecutionState>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>> {
        Ok(self
            .states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(thread_id)
            .cloned())
    }

    fn delete(&self, thread_id: &str) -> Result<()> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(thread_id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;

    fn sample_state() -> ExecutionState {
        ExecutionState::new(
            "find all W2 documents",
            Plan::single("Direct filter on type", "find documents where type is W2"),
        )
    }

    #[test]
    fn save_load_delete_round_trip() {
        let store = MemoryCheckpointStore::new();
        let state = sample_state();

        store.save("thread-1", &state).unwrap();
        let loaded = store.load("thread-1").unwrap().unwrap();
        assert_eq!(loaded.request, state.request);

        store.delete("thread-1").unwrap();
        assert!(store.load("thread-1").unwrap().is_none());
    }

    #[test]
    fn save_replaces_the_previous_checkpoint() {
        let store = MemoryCheckpointStore::new();
        let mut state = sample_state();

        store.save("thread-1", &state).unwrap();
        state.advance();
        store.save("thread-1", &state).unwrap();

        let loaded = store.load("thread-1").unwrap().unwrap();
        assert_eq!(loaded.current_step, 2);
    }

    #[test]
    fn list_is_sorted() {
        let store = MemoryCheckpointStore::new();
        store.save("b", &sample_state()).unwrap();
        store.save("a", &sample_state()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn deleting_an_unknown_thread_is_fine() {
        let store = MemoryCheckpointStore::new();
        assert!(store.delete("missing").is_ok());
    }
}
