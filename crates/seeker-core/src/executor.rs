//! Per-step state machine: generate, validate, execute, classify.
//!
//! One invocation drives the current step of an [`ExecutionState`] through
//! GENERATING → VALIDATING → EXECUTING → CLASSIFYING and reports how the
//! router should proceed. Two independent bounded-retry policies apply:
//! feedback-guided regeneration for structural query failures, and
//! exponential backoff for transient backend failures.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde_json::Value;

use crate::{
    clarify,
    error::{AgentError, Result},
    models::{ExecutionState, Step, StepResult},
    query::{collect_fields, validate_query},
    services::{GeneratedQuery, GenerationService, QueryContext, SearchBackend, SearchResponse},
};

/// Failed query validations allowed before a step is declared fatal.
pub const MAX_VALIDATION_RETRIES: u32 = 3;

/// Failed backend calls allowed per execution attempt.
pub const MAX_EXECUTION_RETRIES: u32 = 2;

/// How the router should proceed after one executor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed and a later step remains
    Advanced,

    /// The final step completed; the run is finished
    Done,

    /// An intermediate step is ambiguous; the run must suspend
    NeedsClarification,

    /// The run failed; `state.error` holds the terminal message
    Fatal,
}

/// Executes plan steps against the injected collaborators.
pub struct StepExecutor {
    generation: Arc<dyn GenerationService>,
    backend: Arc<dyn SearchBackend>,
}

impl StepExecutor {
    /// Creates an executor over the injected services.
    pub fn new(generation: Arc<dyn GenerationService>, backend: Arc<dyn SearchBackend>) -> Self {
        Self { generation, backend }
    }

    /// Runs the state's current step to one of the four outcomes.
    ///
    /// Validation and execution retries are handled internally; the state's
    /// counters are updated as they happen so a persisted checkpoint always
    /// reflects the true attempt history.
    pub async fn run_step(&self, state: &mut ExecutionState) -> Result<StepOutcome> {
        let step = state
            .plan
            .step(state.current_step)
            .cloned()
            .ok_or_else(|| AgentError::Configuration {
                message: format!("plan has no step {}", state.current_step),
            })?;

        info!(
            "executing step {} of {}: {}",
            state.current_step,
            state.total_steps(),
            step.description
        );

        let query = match self.generate_valid_query(state, &step) {
            GenerationResult::Query(query) => query,
            GenerationResult::Fatal => return Ok(StepOutcome::Fatal),
        };

        let started = Instant::now();
        let response = match self.execute_with_backoff(state, &query).await {
            Some(response) => response,
            None => return Ok(StepOutcome::Fatal),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        Ok(self.classify(state, &step, query, response, elapsed_ms))
    }

    /// GENERATING ⇄ VALIDATING loop. Returns a structurally valid query or
    /// marks the state fatal.
    fn generate_valid_query(&self, state: &mut ExecutionState, step: &Step) -> GenerationResult {
        loop {
            let generated = {
                let prior_result = step.depends_on.and_then(|dep| state.result(dep));
                let ctx = QueryContext {
                    step_description: &step.description,
                    original_request: &state.request,
                    current_step: state.current_step,
                    total_steps: state.total_steps(),
                    prior_result,
                    feedback: &state.validation_feedback,
                };
                self.generation.generate_query(&ctx)
            };

            let query = match generated {
                Ok(GeneratedQuery::Query(query)) => query,
                Ok(GeneratedQuery::Refused { kind, message }) => {
                    // Domain errors are never retried: the same input would
                    // reproduce the same refusal.
                    warn!("generation refused step {}: {kind}: {message}", step.index);
                    state.fail(
                        AgentError::GenerationRefused {
                            kind: kind.to_string(),
                            message,
                        }
                        .to_string(),
                    );
                    return GenerationResult::Fatal;
                }
                Err(e) => {
                    state.fail(format!(
                        "Failed to generate query for step {}: {e}",
                        step.index
                    ));
                    return GenerationResult::Fatal;
                }
            };

            let errors = validate_query(&query);
            if errors.is_empty() {
                debug!("query for step {} touches {:?}", step.index, collect_fields(&query));
                state.validation_feedback.clear();
                return GenerationResult::Query(query);
            }

            if state.validation_retries >= MAX_VALIDATION_RETRIES {
                state.fail(format!(
                    "Could not produce a valid query for step {} after {} attempts: {}",
                    step.index,
                    MAX_VALIDATION_RETRIES + 1,
                    errors.join("; ")
                ));
                return GenerationResult::Fatal;
            }

            state.validation_retries += 1;
            warn!(
                "query validation failed (attempt {}/{}): {}",
                state.validation_retries,
                MAX_VALIDATION_RETRIES,
                errors.join("; ")
            );
            state.validation_feedback = errors;
        }
    }

    /// EXECUTING loop with exponential backoff (2s, 4s). Returns the
    /// backend response or marks the state fatal. The retry counter resets
    /// on every entry: execution retries are per attempt, not per run.
    async fn execute_with_backoff(
        &self,
        state: &mut ExecutionState,
        query: &Value,
    ) -> Option<SearchResponse> {
        state.execution_retries = 0;
        debug!("executing query: {query}");

        loop {
            match self.backend.search(query) {
                Ok(response) => return Some(response),
                Err(e) => {
                    if state.execution_retries >= MAX_EXECUTION_RETRIES {
                        state.fail(format!("Service unavailable after retries: {e}"));
                        return None;
                    }
                    state.execution_retries += 1;
                    let delay = 2u64.pow(state.execution_retries);
                    warn!(
                        "backend call failed, retrying in {delay}s (attempt {}/{}): {e}",
                        state.execution_retries, MAX_EXECUTION_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
            }
        }
    }

    /// CLASSIFYING: inspects the hit count and decides the outcome.
    fn classify(
        &self,
        state: &mut ExecutionState,
        step: &Step,
        query: Value,
        response: SearchResponse,
        elapsed_ms: u64,
    ) -> StepOutcome {
        let final_step = state.is_final_step();
        info!(
            "step {} returned {} hit(s) ({}ms)",
            step.index, response.hit_count, elapsed_ms
        );

        match response.hit_count {
            // An empty intermediate lookup makes every later step
            // unanswerable; no amount of regeneration changes that.
            0 if !final_step => {
                state.fail("Cannot proceed: referenced entity not found");
                StepOutcome::Fatal
            }
            0 => {
                state.record_result(StepResult::many(step.index, query, Vec::new(), elapsed_ms));
                StepOutcome::Done
            }
            1 => {
                let Some(document) = response.documents.into_iter().next() else {
                    state.fail("Backend reported one hit but returned no documents");
                    return StepOutcome::Fatal;
                };
                state.record_result(StepResult::single(step.index, query, document, elapsed_ms));
                self.advance(state)
            }
            _ if !final_step => {
                let request =
                    clarify::build_clarification(step, query, &response.documents);
                info!(
                    "step {} is ambiguous with {} candidates, requesting clarification",
                    step.index,
                    request.options.len()
                );
                state.pending_clarification = Some(request);
                StepOutcome::NeedsClarification
            }
            _ => {
                state.record_result(StepResult::many(
                    step.index,
                    query,
                    response.documents,
                    elapsed_ms,
                ));
                self.advance(state)
            }
        }
    }

    /// ADVANCE: moves to the next step or finishes the run.
    fn advance(&self, state: &mut ExecutionState) -> StepOutcome {
        if state.has_more_steps() {
            state.advance();
            StepOutcome::Advanced
        } else {
            StepOutcome::Done
        }
    }
}

enum GenerationResult {
    Query(Value),
    Fatal,
}
