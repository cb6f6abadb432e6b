//! Human-in-the-loop clarification: building the question and applying
//! the user's answer.

use serde_json::Value;

use crate::{
    error::{AgentError, Result},
    models::{ClarificationOption, ClarificationRequest, ExecutionState, Step, StepResult},
};

/// What applying a selection did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionApplied {
    /// The selected candidate was recorded and a later step remains
    Advanced,

    /// The selected candidate completed the final step
    Done,

    /// Nothing was pending; the state is unchanged
    NothingPending,
}

/// Builds the multiple-choice question for an ambiguous intermediate step.
///
/// Ordinals are 1-indexed and stable: option N always refers to the Nth
/// document in backend order, so a persisted request and a later answer
/// agree on which candidate was meant.
pub fn build_clarification(
    step: &Step,
    query: Value,
    documents: &[Value],
) -> ClarificationRequest {
    let entity = documents
        .first()
        .and_then(|doc| doc.get("entityType"))
        .and_then(Value::as_str)
        .unwrap_or("entity")
        .to_lowercase();

    let options = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| ClarificationOption {
            ordinal: i as u32 + 1,
            label: display_label(doc),
            value: doc.clone(),
        })
        .collect::<Vec<_>>();

    ClarificationRequest {
        step_index: step.index,
        prompt: format!(
            "I found {} {entity}s matching '{}'. Which one would you like?",
            documents.len(),
            step.description
        ),
        options,
        query,
    }
}

/// Applies the user's answer to a suspended state.
///
/// Out-of-range ordinals are rejected without mutating the state, so the
/// caller can re-prompt against the same pending request. The chosen
/// candidate is recorded as if the suspended step had returned it as the
/// sole hit, and the state moves on to the next step.
pub fn apply_selection(state: &mut ExecutionState, ordinal: u32) -> Result<SelectionApplied> {
    let Some(pending) = state.pending_clarification.as_ref() else {
        return Ok(SelectionApplied::NothingPending);
    };

    let max = pending.options.len() as u32;
    let Some(option) = pending.option(ordinal) else {
        return Err(AgentError::InvalidSelection { ordinal, max });
    };

    let result = StepResult::single(
        pending.step_index,
        pending.query.clone(),
        option.value.clone(),
        0,
    );
    state.pending_clarification = None;
    state.record_result(result);

    if state.has_more_steps() {
        state.advance();
        Ok(SelectionApplied::Advanced)
    } else {
        Ok(SelectionApplied::Done)
    }
}

/// Display label for one candidate, keyed on its entity type.
fn display_label(doc: &Value) -> String {
    let entity = doc
        .get("entityType")
        .and_then(Value::as_str)
        .unwrap_or("entity");

    match entity {
        "FOLDER" => folder_path(doc),
        "DOCUMENT" => common_name(doc),
        _ => format!("{entity}: {}", common_name(doc)),
    }
}

/// Absolute-looking folder path, falling back to the bare name.
fn folder_path(doc: &Value) -> String {
    let path = doc
        .get("organizationAttributes")
        .and_then(|o| o.get("folderPath"))
        .and_then(Value::as_str)
        .unwrap_or("");

    if path.is_empty() {
        return format!("/{}", common_name(doc));
    }
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn common_name(doc: &Value) -> String {
    doc.get("commonAttributes")
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{Plan, PlanKind};

    fn folder(name: &str, path: &str) -> Value {
        json!({
            "entityType": "FOLDER",
            "commonAttributes": {"name": name},
            "organizationAttributes": {"folderPath": path}
        })
    }

    fn two_step_state() -> ExecutionState {
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
        ExecutionState::new("list documents in the Taxes folder", plan)
    }

    #[test]
    fn options_are_one_indexed_in_backend_order() {
        let step = Step {
            index: 1,
            description: "find the folder named Taxes".to_string(),
            depends_on: None,
        };
        let docs = vec![
            folder("Taxes", "root/Personal/Taxes"),
            folder("Taxes", "root/Business/Taxes"),
        ];
        let request = build_clarification(&step, json!({"match_all": {}}), &docs);

        assert_eq!(request.step_index, 1);
        assert!(request.prompt.contains("2 folders"));
        assert_eq!(request.options[0].ordinal, 1);
        assert_eq!(request.options[0].label, "/root/Personal/Taxes");
        assert_eq!(request.options[1].ordinal, 2);
        assert_eq!(request.options[1].label, "/root/Business/Taxes");
    }

    #[test]
    fn document_labels_use_the_name() {
        let doc = json!({
            "entityType": "DOCUMENT",
            "commonAttributes": {"name": "W2_2024.pdf"}
        });
        assert_eq!(display_label(&doc), "W2_2024.pdf");
    }

    #[test]
    fn selection_records_the_candidate_and_advances() {
        let mut state = two_step_state();
        let step = state.plan.steps[0].clone();
        state.pending_clarification = Some(build_clarification(
            &step,
            json!({"term": {"commonAttributes.name": "Taxes"}}),
            &[
                folder("Taxes", "root/Personal/Taxes"),
                folder("Taxes", "root/Business/Taxes"),
            ],
        ));

        let applied = apply_selection(&mut state, 2).unwrap();

        assert_eq!(applied, SelectionApplied::Advanced);
        assert_eq!(state.current_step, 2);
        assert!(state.pending_clarification.is_none());
        let recorded = state.result(1).unwrap();
        assert_eq!(recorded.hit_count, 1);
        assert_eq!(
            recorded.documents.as_one().unwrap()["organizationAttributes"]["folderPath"],
            "root/Business/Taxes"
        );
    }

    #[test]
    fn out_of_range_selection_leaves_the_state_untouched() {
        let mut state = two_step_state();
        let step = state.plan.steps[0].clone();
        state.pending_clarification = Some(build_clarification(
            &step,
            json!({"match_all": {}}),
            &[folder("Taxes", "root/Taxes"), folder("Taxes", "root/Old")],
        ));

        let err = apply_selection(&mut state, 5).unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidSelection { ordinal: 5, max: 2 }
        ));
        assert!(state.pending_clarification.is_some());
        assert_eq!(state.current_step, 1);
    }

    #[test]
    fn resuming_without_a_pending_question_is_a_no_op() {
        let mut state = two_step_state();
        let applied = apply_selection(&mut state, 1).unwrap();
        assert_eq!(applied, SelectionApplied::NothingPending);
        assert_eq!(state.current_step, 1);
    }
}
