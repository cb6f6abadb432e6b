//! Gap-analysis planner: turns a request into a validated execution plan.
//!
//! The generation service performs the gap analysis itself (deciding whether
//! the request needs one query or a short dependency chain); this module
//! owns structural validation of its candidates and the bounded,
//! feedback-guided retry loop around it.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    error::{AgentError, Result},
    models::Plan,
    services::GenerationService,
};

/// Generation attempts before planning is declared failed.
const MAX_PLAN_ATTEMPTS: u32 = 3;

/// Produces validated plans from natural-language requests.
pub struct Planner {
    generation: Arc<dyn GenerationService>,
}

impl Planner {
    /// Creates a planner over the injected generation service.
    pub fn new(generation: Arc<dyn GenerationService>) -> Self {
        Self { generation }
    }

    /// Performs gap analysis on the request and returns an accepted plan.
    ///
    /// Each attempt parses the service's raw JSON into a [`Plan`] and runs
    /// [`Plan::validate`]; the concrete violations are appended to the next
    /// attempt's context. After [`MAX_PLAN_ATTEMPTS`] failures this returns
    /// [`AgentError::PlanningFailed`].
    pub fn plan(&self, request: &str) -> Result<Plan> {
        info!("planning request: {request}");

        let mut feedback: Vec<String> = Vec::new();

        for attempt in 1..=MAX_PLAN_ATTEMPTS {
            debug!("plan generation attempt {attempt}/{MAX_PLAN_ATTEMPTS}");

            let raw = self.generation.generate_plan(request, &feedback)?;

            let errors = match serde_json::from_value::<Plan>(raw) {
                Ok(plan) => {
                    let errors = plan.validate();
                    if errors.is_empty() {
                        info!(
                            "accepted {} plan with {} step(s)",
                            plan.kind,
                            plan.steps.len()
                        );
                        return Ok(plan);
                    }
                    errors
                }
                Err(e) => vec![format!("candidate plan is not well-formed: {e}")],
            };

            warn!(
                "plan validation failed (attempt {attempt}/{MAX_PLAN_ATTEMPTS}): {}",
                errors.join("; ")
            );
            feedback = errors;
        }

        Err(AgentError::PlanningFailed {
            detail: format!(
                "no structurally valid plan after {MAX_PLAN_ATTEMPTS} attempts: {}",
                feedback.join("; ")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::*;
    use crate::services::{GeneratedQuery, QueryContext};

    /// Test double that replays a fixed sequence of plan candidates and
    /// records the feedback it was handed.
    struct ScriptedGeneration {
        candidates: Vec<Value>,
        calls: AtomicU32,
        seen_feedback: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedGeneration {
        fn new(candidates: Vec<Value>) -> Self {
            Self {
                candidates,
                calls: AtomicU32::new(0),
                seen_feedback: Mutex::new(Vec::new()),
            }
        }
    }

    impl GenerationService for ScriptedGeneration {
        fn generate_plan(&self, _request: &str, feedback: &[String]) -> Result<Value> {
            self.seen_feedback
                .lock()
                .unwrap()
                .push(feedback.to_vec());
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            Ok(self
                .candidates
                .get(call.min(self.candidates.len() - 1))
                .cloned()
                .unwrap())
        }

        fn generate_query(&self, _ctx: &QueryContext<'_>) -> Result<GeneratedQuery> {
            unimplemented!("planner tests never generate queries")
        }
    }

    fn valid_plan_json() -> Value {
        json!({
            "kind": "single",
            "rationale": "Document type is filterable directly",
            "step_count": 1,
            "steps": [{"index": 1, "description": "find documents where type is W2"}]
        })
    }

    #[test]
    fn first_valid_candidate_is_accepted() {
        let service = Arc::new(ScriptedGeneration::new(vec![valid_plan_json()]));
        let planner = Planner::new(service.clone());
        let plan = planner.plan("find all W2 documents").unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn validation_errors_are_fed_back_to_the_next_attempt() {
        let invalid = json!({
            "kind": "single",
            "rationale": "Declared count is wrong",
            "step_count": 2,
            "steps": [{"index": 1, "description": "find documents where type is W2"}]
        });
        let service = Arc::new(ScriptedGeneration::new(vec![invalid, valid_plan_json()]));
        let planner = Planner::new(service.clone());

        let plan = planner.plan("find all W2 documents").unwrap();
        assert_eq!(plan.step_count, 1);

        let feedback = service.seen_feedback.lock().unwrap();
        assert!(feedback[0].is_empty());
        assert!(feedback[1][0].contains("step_count"));
    }

    #[test]
    fn planning_fails_after_three_invalid_candidates() {
        let invalid = json!({"kind": "single", "rationale": "x", "step_count": 0, "steps": []});
        let service = Arc::new(ScriptedGeneration::new(vec![invalid]));
        let planner = Planner::new(service.clone());

        let err = planner.plan("unintelligible").unwrap_err();
        assert!(matches!(err, AgentError::PlanningFailed { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn malformed_json_counts_as_a_failed_attempt() {
        let service = Arc::new(ScriptedGeneration::new(vec![
            json!("not a plan"),
            valid_plan_json(),
        ]));
        let planner = Planner::new(service);
        assert!(planner.plan("find all W2 documents").is_ok());
    }
}
