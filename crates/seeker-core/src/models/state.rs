//! Mutable execution envelope carried across a whole run.
//!
//! The dynamically-keyed state dictionary of graph-style agents is modelled
//! here as an explicit struct with optional fields, which removes the
//! "missing key" class of bugs and makes the envelope serde round-trippable
//! for the checkpoint store.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ClarificationRequest, Plan, StepResult};

/// The state mutated exclusively by the step executor while a request runs.
///
/// Created when the planner hands off its plan; discarded at a terminal
/// state or persisted to the checkpoint store while a clarification is
/// pending. Results accumulate in an ordered map that only grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionState {
    /// The original natural-language request, kept for traceability
    pub request: String,

    /// The accepted plan being executed
    pub plan: Plan,

    /// Step currently being executed (1-indexed)
    pub current_step: u32,

    /// Failed query validations for the current step
    pub validation_retries: u32,

    /// Failed backend calls for the current execution attempt
    pub execution_retries: u32,

    /// Validation errors fed back into the next generation attempt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_feedback: Vec<String>,

    /// Terminal error, if the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Completed step results, keyed by step index
    #[serde(default)]
    pub results: BTreeMap<u32, StepResult>,

    /// Active clarification, if the run is suspended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_clarification: Option<ClarificationRequest>,

    /// When this state was created (UTC)
    pub created_at: Timestamp,

    /// When this state was last mutated (UTC)
    pub updated_at: Timestamp,
}

impl ExecutionState {
    /// Creates a fresh state positioned at the plan's first step.
    pub fn new(request: impl Into<String>, plan: Plan) -> Self {
        let now = Timestamp::now();
        Self {
            request: request.into(),
            plan,
            current_step: 1,
            validation_retries: 0,
            execution_retries: 0,
            validation_feedback: Vec::new(),
            error: None,
            results: BTreeMap::new(),
            pending_clarification: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total number of steps in the plan.
    pub fn total_steps(&self) -> u32 {
        self.plan.steps.len() as u32
    }

    /// Whether the current step is the plan's last one.
    pub fn is_final_step(&self) -> bool {
        self.current_step >= self.total_steps()
    }

    /// Whether steps remain after the current one.
    pub fn has_more_steps(&self) -> bool {
        self.current_step < self.total_steps()
    }

    /// The result a given step produced, if it has completed.
    pub fn result(&self, step_index: u32) -> Option<&StepResult> {
        self.results.get(&step_index)
    }

    /// The final step's result, which is the request's terminal output.
    pub fn final_result(&self) -> Option<&StepResult> {
        self.results.get(&self.total_steps())
    }

    /// Stores a completed step's result and bumps the update timestamp.
    pub fn record_result(&mut self, result: StepResult) {
        self.results.insert(result.step_index, result);
        self.touch();
    }

    /// Marks the run as fatally failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.touch();
    }

    /// Advances to the next step, resetting the per-step validation
    /// counter and any carried feedback.
    pub fn advance(&mut self) {
        self.current_step += 1;
        self.validation_retries = 0;
        self.validation_feedback.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;
    use serde_json::json;

    fn state() -> ExecutionState {
        ExecutionState::new(
            "find all W2 documents",
            Plan::single("Direct filter on type", "find documents where type is W2"),
        )
    }

    #[test]
    fn fresh_state_points_at_first_step() {
        let state = state();
        assert_eq!(state.current_step, 1);
        assert!(state.is_final_step());
        assert!(!state.has_more_steps());
        assert!(state.final_result().is_none());
    }

    #[test]
    fn results_accumulate_by_step_index() {
        let mut state = state();
        let result =
            crate::models::StepResult::single(1, json!({"match_all": {}}), json!({"n": 1}), 3);
        state.record_result(result);
        assert_eq!(state.result(1).unwrap().step_index, 1);
        assert!(state.final_result().is_some());
    }

    #[test]
    fn advance_resets_validation_state() {
        let mut state = state();
        state.validation_retries = 2;
        state.validation_feedback.push("bad clause".to_string());
        state.advance();
        assert_eq!(state.current_step, 2);
        assert_eq!(state.validation_retries, 0);
        assert!(state.validation_feedback.is_empty());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = state();
        state.record_result(crate::models::StepResult::many(
            1,
            json!({"match_all": {}}),
            vec![json!({"n": 1}), json!({"n": 2})],
            4,
        ));
        let blob = serde_json::to_string(&state).unwrap();
        let back: ExecutionState = serde_json::from_str(&blob).unwrap();
        assert_eq!(state, back);
    }
}
