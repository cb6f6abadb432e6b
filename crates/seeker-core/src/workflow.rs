//! Top-level router: plan a request, drive its steps, suspend and resume.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use tokio::task;

use crate::{
    checkpoint::{CheckpointStore, SqliteCheckpointStore},
    clarify::{self, SelectionApplied},
    error::{AgentError, Result},
    executor::{StepExecutor, StepOutcome},
    models::{ClarificationRequest, Documents, ExecutionState},
    planner::Planner,
    services::{GenerationService, SearchBackend},
};

/// Terminal or suspended result of driving a workflow.
#[derive(Debug)]
pub enum RunOutcome {
    /// The final step completed; `documents` is its result set.
    Complete {
        documents: Documents,
        state: ExecutionState,
    },

    /// An intermediate step was ambiguous; the run is suspended and the
    /// caller must answer `request` via [`Workflow::resume`].
    NeedsClarification { request: ClarificationRequest },

    /// The run hit a terminal error. Results recorded before the failure
    /// stay in `state` for diagnostics.
    Failed { error: String, state: ExecutionState },
}

/// Builder for creating and configuring Workflow instances.
pub struct WorkflowBuilder {
    generation: Arc<dyn GenerationService>,
    backend: Arc<dyn SearchBackend>,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
    state_db_path: Option<PathBuf>,
}

impl WorkflowBuilder {
    /// Creates a builder over the two required collaborators.
    pub fn new(generation: Arc<dyn GenerationService>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            generation,
            backend,
            checkpoints: None,
            state_db_path: None,
        }
    }

    /// Uses the given checkpoint store instead of the SQLite default.
    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Sets a custom state database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/seeker/state.db` or `~/.local/share/seeker/state.db`
    pub fn with_state_db_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.state_db_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured workflow instance.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::FileSystem` if the state database path is invalid
    /// Returns `AgentError::Checkpoint` if store initialization fails
    pub async fn build(self) -> Result<Workflow> {
        let checkpoints: Arc<dyn CheckpointStore> = match self.checkpoints {
            Some(store) => store,
            None => {
                let db_path = if let Some(path) = self.state_db_path {
                    path
                } else {
                    Self::default_state_db_path()?
                };

                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| AgentError::FileSystem {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }

                let store = task::spawn_blocking(move || SqliteCheckpointStore::new(&db_path))
                    .await
                    .map_err(|e| AgentError::Configuration {
                        message: format!("Task join error: {e}"),
                    })??;
                Arc::new(store)
            }
        };

        Ok(Workflow {
            planner: Planner::new(self.generation.clone()),
            executor: StepExecutor::new(self.generation, self.backend),
            checkpoints,
        })
    }

    /// Returns the default state database path following XDG Base Directory
    /// specification.
    fn default_state_db_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("seeker")
            .place_data_file("state.db")
            .map_err(|e| AgentError::XdgDirectory(e.to_string()))
    }
}

/// Drives requests end to end over the injected collaborators.
pub struct Workflow {
    planner: Planner,
    executor: StepExecutor,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl Workflow {
    /// Answers a request, suspending if a clarification is needed.
    ///
    /// `thread_id` names the conversation: a suspended run is checkpointed
    /// under it, and terminal outcomes remove any checkpoint it held.
    pub async fn run(&self, request: &str, thread_id: &str) -> Result<RunOutcome> {
        let request = request.trim();
        if request.is_empty() {
            return Err(AgentError::InvalidInput {
                field: "request".to_string(),
                reason: "request must not be empty".to_string(),
            });
        }

        let plan = self.planner.plan(request)?;
        let state = ExecutionState::new(request, plan);
        self.drive(state, thread_id).await
    }

    /// Resumes a suspended thread with the user's 1-indexed choice.
    ///
    /// An out-of-range choice leaves the checkpoint untouched so the caller
    /// can ask again.
    pub async fn resume(&self, thread_id: &str, ordinal: u32) -> Result<RunOutcome> {
        let mut state = self
            .checkpoints
            .load(thread_id)?
            .ok_or_else(|| AgentError::ThreadNotFound {
                thread_id: thread_id.to_string(),
            })?;

        match clarify::apply_selection(&mut state, ordinal)? {
            SelectionApplied::NothingPending => Err(AgentError::NoPendingClarification {
                thread_id: thread_id.to_string(),
            }),
            SelectionApplied::Done => self.finish(state, thread_id),
            SelectionApplied::Advanced => {
                info!("thread {thread_id} resumed at step {}", state.current_step);
                self.drive(state, thread_id).await
            }
        }
    }

    /// Loads a suspended thread's state, if any.
    pub fn checkpoint(&self, thread_id: &str) -> Result<Option<ExecutionState>> {
        self.checkpoints.load(thread_id)
    }

    /// Lists the thread ids with a suspended run.
    pub fn suspended_threads(&self) -> Result<Vec<String>> {
        self.checkpoints.list()
    }

    /// Executor loop: runs steps until the state suspends or terminates.
    async fn drive(&self, mut state: ExecutionState, thread_id: &str) -> Result<RunOutcome> {
        loop {
            match self.executor.run_step(&mut state).await? {
                StepOutcome::Advanced => continue,
                StepOutcome::Done => return self.finish(state, thread_id),
                StepOutcome::NeedsClarification => {
                    self.checkpoints.save(thread_id, &state)?;
                    let Some(request) = state.pending_clarification else {
                        return Err(AgentError::Configuration {
                            message: "suspended without a pending clarification".to_string(),
                        });
                    };
                    return Ok(RunOutcome::NeedsClarification { request });
                }
                StepOutcome::Fatal => {
                    self.checkpoints.delete(thread_id)?;
                    let error = state
                        .error
                        .clone()
                        .unwrap_or_else(|| "execution failed".to_string());
                    return Ok(RunOutcome::Failed { error, state });
                }
            }
        }
    }

    /// Terminal success: drops the checkpoint and extracts the final set.
    fn finish(&self, state: ExecutionState, thread_id: &str) -> Result<RunOutcome> {
        self.checkpoints.delete(thread_id)?;
        let Some(result) = state.final_result() else {
            return Err(AgentError::Configuration {
                message: "run completed without a final step result".to_string(),
            });
        };
        let documents = result.documents.clone();
        info!(
            "thread {thread_id} complete with {} document(s)",
            documents.len()
        );
        Ok(RunOutcome::Complete { documents, state })
    }
}
