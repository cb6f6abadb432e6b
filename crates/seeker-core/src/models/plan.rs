//! Plan and step model definitions with structural validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minimum length for a step description. Guards against degenerate
/// one-word plans coming back from the generation service.
pub const MIN_STEP_DESCRIPTION_LEN: usize = 10;

/// Maximum number of steps a plan may declare. Requests whose gap analysis
/// would need a longer chain are a planning failure, never truncated.
pub const MAX_PLAN_STEPS: usize = 3;

/// Whether a plan resolves in one backend query or a dependency chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Every condition is directly resolvable with one query
    Single,

    /// An earlier lookup must supply values for a later query
    Multi,
}

impl FromStr for PlanKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(PlanKind::Single),
            "multi" => Ok(PlanKind::Multi),
            _ => Err(format!("Invalid plan kind: {s}")),
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Single => write!(f, "single"),
            PlanKind::Multi => write!(f, "multi"),
        }
    }
}

/// One backend query's worth of work within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    /// Step number within the plan (1-indexed)
    pub index: u32,

    /// Natural language goal for the step, never backend query syntax
    pub description: String,

    /// Index of an earlier step whose result this step substitutes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<u32>,
}

/// Ordered, acyclic execution plan for a search request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    /// Single query or dependency chain
    pub kind: PlanKind,

    /// Explanation of the gap analysis behind this plan
    pub rationale: String,

    /// Declared step count; must match `steps.len()`
    pub step_count: u32,

    /// The ordered steps
    pub steps: Vec<Step>,
}

impl Plan {
    /// Convenience constructor for a one-step plan.
    pub fn single(rationale: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: PlanKind::Single,
            rationale: rationale.into(),
            step_count: 1,
            steps: vec![Step {
                index: 1,
                description: description.into(),
                depends_on: None,
            }],
        }
    }

    /// Number of steps in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps (always invalid, but kept total).
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Looks up a step by its 1-indexed number.
    pub fn step(&self, index: u32) -> Option<&Step> {
        self.steps.iter().find(|s| s.index == index)
    }

    /// Runs every structural check required before a candidate plan is
    /// accepted. Returns the concrete violations so the planner can feed
    /// them back into the next generation attempt.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.steps.is_empty() {
            errors.push("plan must contain at least one step".to_string());
        }

        if self.steps.len() > MAX_PLAN_STEPS {
            errors.push(format!(
                "plan declares {} steps but at most {MAX_PLAN_STEPS} are allowed",
                self.steps.len()
            ));
        }

        if self.step_count as usize != self.steps.len() {
            errors.push(format!(
                "step_count ({}) does not match number of steps ({})",
                self.step_count,
                self.steps.len()
            ));
        }

        match self.kind {
            PlanKind::Single if self.steps.len() != 1 => {
                errors.push(format!(
                    "single plan must have exactly 1 step, found {}",
                    self.steps.len()
                ));
            }
            PlanKind::Multi if self.steps.len() < 2 => {
                errors.push(format!(
                    "multi plan must have at least 2 steps, found {}",
                    self.steps.len()
                ));
            }
            _ => {}
        }

        for (position, step) in self.steps.iter().enumerate() {
            let expected = position as u32 + 1;
            if step.index != expected {
                errors.push(format!(
                    "steps must be numbered sequentially from 1: expected {expected}, found {}",
                    step.index
                ));
            }

            if step.description.trim().len() < MIN_STEP_DESCRIPTION_LEN {
                errors.push(format!(
                    "step {} description is too short (minimum {MIN_STEP_DESCRIPTION_LEN} characters)",
                    step.index
                ));
            }

            if let Some(dep) = step.depends_on {
                if dep >= step.index {
                    errors.push(format!(
                        "step {} cannot depend on step {dep} (must depend on an earlier step)",
                        step.index
                    ));
                } else if self.step(dep).is_none() {
                    errors.push(format!(
                        "step {} depends on non-existent step {dep}",
                        step.index
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_plan() -> Plan {
        Plan {
            kind: PlanKind::Multi,
            rationale: "Folder must be resolved to an id first".to_string(),
            step_count: 2,
            steps: vec![
                Step {
                    index: 1,
                    description: "Find the folder named 'Tax Documents'".to_string(),
                    depends_on: None,
                },
                Step {
                    index: 2,
                    description: "Find documents under that folder".to_string(),
                    depends_on: Some(1),
                },
            ],
        }
    }

    #[test]
    fn valid_multi_step_plan_passes() {
        assert!(two_step_plan().validate().is_empty());
    }

    #[test]
    fn valid_single_step_plan_passes() {
        let plan = Plan::single("Direct filter on document type", "Find all W2 documents");
        assert!(plan.validate().is_empty());
    }

    #[test]
    fn step_count_mismatch_is_reported() {
        let mut plan = two_step_plan();
        plan.step_count = 3;
        let errors = plan.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("step_count"));
    }

    #[test]
    fn kind_must_match_step_count() {
        let mut plan = two_step_plan();
        plan.kind = PlanKind::Single;
        assert!(plan
            .validate()
            .iter()
            .any(|e| e.contains("exactly 1 step")));

        let mut single = Plan::single("Direct filter on type", "Find all W2 documents");
        single.kind = PlanKind::Multi;
        assert!(single
            .validate()
            .iter()
            .any(|e| e.contains("at least 2 steps")));
    }

    #[test]
    fn steps_must_be_sequential_from_one() {
        let mut plan = two_step_plan();
        plan.steps[1].index = 3;
        assert!(plan
            .validate()
            .iter()
            .any(|e| e.contains("expected 2, found 3")));
    }

    #[test]
    fn dependency_must_reference_earlier_step() {
        let mut plan = two_step_plan();
        plan.steps[1].depends_on = Some(2);
        assert!(plan
            .validate()
            .iter()
            .any(|e| e.contains("earlier step")));
    }

    #[test]
    fn chains_longer_than_three_are_rejected() {
        let mut plan = two_step_plan();
        for index in 3..=4 {
            plan.steps.push(Step {
                index,
                description: "Another lookup with enough words".to_string(),
                depends_on: Some(index - 1),
            });
        }
        plan.step_count = 4;
        assert!(plan.validate().iter().any(|e| e.contains("at most 3")));
    }

    #[test]
    fn short_descriptions_are_rejected() {
        let mut plan = Plan::single("Direct filter on type", "W2");
        plan.step_count = 1;
        assert!(plan.validate().iter().any(|e| e.contains("too short")));
    }

    #[test]
    fn plan_round_trips_through_json() {
        let plan = two_step_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
