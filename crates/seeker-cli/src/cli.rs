//! Command handlers bridging parsed arguments to the workflow engine.
//!
//! Each handler converts the outcome of a workflow call into rendered
//! terminal output. Suspensions print the clarification question together
//! with the exact resume invocation; failures surface as process errors.

use anyhow::{bail, Context, Result};
use jiff::Timestamp;
use seeker_core::{
    params::{ResumeRequest, SearchRequest, ThreadId},
    ResultSet, RunOutcome, Workflow,
};

use crate::renderer::TerminalRenderer;

/// CLI command handler holding the workflow and renderer.
pub struct Cli {
    workflow: Workflow,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(workflow: Workflow, renderer: TerminalRenderer) -> Self {
        Self { workflow, renderer }
    }

    /// Runs a search request, generating a thread id when none was given.
    pub async fn search(&self, params: SearchRequest) -> Result<()> {
        let thread_id = params
            .thread_id
            .unwrap_or_else(|| format!("t{}", Timestamp::now().as_millisecond()));

        let outcome = self
            .workflow
            .run(&params.request, &thread_id)
            .await
            .context("Search failed")?;
        self.render_outcome(outcome, &thread_id)
    }

    /// Answers a pending clarification on a suspended thread.
    pub async fn resume(&self, params: ResumeRequest) -> Result<()> {
        let outcome = self
            .workflow
            .resume(&params.thread_id, params.choice)
            .await
            .context("Resume failed")?;
        self.render_outcome(outcome, &params.thread_id)
    }

    /// Shows the persisted state of a suspended thread.
    pub async fn show(&self, params: ThreadId) -> Result<()> {
        let Some(state) = self
            .workflow
            .checkpoint(&params.thread_id)
            .context("Failed to read thread state")?
        else {
            bail!("No suspended conversation found for thread '{}'", params.thread_id);
        };
        self.renderer.render(&state.to_string())
    }

    fn render_outcome(&self, outcome: RunOutcome, thread_id: &str) -> Result<()> {
        match outcome {
            RunOutcome::Complete { documents, .. } => {
                self.renderer.render(&ResultSet(&documents).to_string())
            }
            RunOutcome::NeedsClarification { request } => {
                self.renderer.render(&request.to_string())?;
                self.renderer.render(&format!(
                    "\nAnswer with: sk resume --thread {thread_id} <choice>\n"
                ))
            }
            RunOutcome::Failed { error, .. } => bail!(error),
        }
    }
}
