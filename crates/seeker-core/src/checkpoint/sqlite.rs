//! Durable checkpoint store backed by SQLite.

use std::path::Path;
use std::sync::Mutex;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    checkpoint::CheckpointStore,
    error::{CheckpointResultExt, Result},
    models::ExecutionState,
};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS checkpoints (
    thread_id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";
const UPSERT_SQL: &str = "INSERT INTO checkpoints (thread_id, state, updated_at) VALUES (?1, ?2, ?3)
    ON CONFLICT(thread_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at";
const SELECT_SQL: &str = "SELECT state FROM checkpoints WHERE thread_id = ?1";
const DELETE_SQL: &str = "DELETE FROM checkpoints WHERE thread_id = ?1";
const LIST_SQL: &str = "SELECT thread_id FROM checkpoints ORDER BY thread_id";

/// SQLite-backed store, one row per suspended thread.
///
/// The state is stored as serialized JSON so the schema never has to track
/// the state's shape. The connection sits behind a mutex because the store
/// is shared as `Arc<dyn CheckpointStore>` across async tasks.
pub struct SqliteCheckpointStore {
    connection: Mutex<Connection>,
}

impl SqliteCheckpointStore {
    /// Opens (or creates) the database at `path` and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            Connection::open(path).db_context("Failed to open checkpoint database")?;
        connection
            .execute(SCHEMA_SQL, [])
            .db_context("Failed to initialize checkpoint schema")?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()> {
        let serialized = serde_json::to_string(state)?;
        let now = Timestamp::now().to_string();
        self.connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .execute(UPSERT_SQL, params![thread_id, serialized, now])
            .db_context("Failed to save checkpoint")?;
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>> {
        let serialized: Option<String> = self
            .connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .query_row(SELECT_SQL, params![thread_id], |row| row.get(0))
            .optional()
            .db_context("Failed to load checkpoint")?;

        match serialized {
            Some(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, thread_id: &str) -> Result<()> {
        self.connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .execute(DELETE_SQL, params![thread_id])
            .db_context("Failed to delete checkpoint")?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let connection = self.connection.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = connection
            .prepare(LIST_SQL)
            .db_context("Failed to prepare checkpoint listing")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .db_context("Failed to list checkpoints")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read checkpoint row")?;
        Ok(ids)
    }
}
