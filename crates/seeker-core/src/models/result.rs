//! Step result model: what one executed step produced.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The record(s) a step produced. An intermediate step always holds exactly
/// one record (ambiguity is resolved through clarification before the result
/// is stored); a final step may legitimately hold zero or many.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Documents {
    /// A single record, as stored for intermediate lookups
    One(Box<Value>),

    /// Zero or more records from a final step
    Many(Vec<Value>),
}

impl Documents {
    /// Number of records held.
    pub fn len(&self) -> usize {
        match self {
            Documents::One(_) => 1,
            Documents::Many(docs) => docs.len(),
        }
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sole record, if this result holds exactly one.
    pub fn as_one(&self) -> Option<&Value> {
        match self {
            Documents::One(doc) => Some(doc),
            Documents::Many(docs) if docs.len() == 1 => docs.first(),
            Documents::Many(_) => None,
        }
    }

    /// All records as a slice-like iterator.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Documents::One(doc) => Box::new(std::iter::once(doc.as_ref())),
            Documents::Many(docs) => Box::new(docs.iter()),
        }
    }
}

/// Immutable record of one successfully executed step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    /// Which step produced this result (1-indexed)
    pub step_index: u32,

    /// The structured query that was executed, kept for traceability
    pub query: Value,

    /// The matching record(s)
    pub documents: Documents,

    /// Number of hits the backend reported
    pub hit_count: u64,

    /// Wall-clock execution time of the backend call
    pub elapsed_ms: u64,

    /// When the step was executed (UTC)
    pub executed_at: Timestamp,
}

impl StepResult {
    /// Builds a result for a step that matched exactly one record, as used
    /// both for unambiguous lookups and for resumed clarifications.
    pub fn single(step_index: u32, query: Value, document: Value, elapsed_ms: u64) -> Self {
        Self {
            step_index,
            query,
            documents: Documents::One(Box::new(document)),
            hit_count: 1,
            elapsed_ms,
            executed_at: Timestamp::now(),
        }
    }

    /// Builds a result holding every hit of a final step.
    pub fn many(step_index: u32, query: Value, documents: Vec<Value>, elapsed_ms: u64) -> Self {
        let hit_count = documents.len() as u64;
        Self {
            step_index,
            query,
            documents: Documents::Many(documents),
            hit_count,
            elapsed_ms,
            executed_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_result_holds_one_document() {
        let result = StepResult::single(1, json!({"match_all": {}}), json!({"name": "a"}), 5);
        assert_eq!(result.hit_count, 1);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents.as_one().unwrap()["name"], "a");
    }

    #[test]
    fn many_result_counts_hits() {
        let result = StepResult::many(
            2,
            json!({"match_all": {}}),
            vec![json!({"n": 1}), json!({"n": 2})],
            7,
        );
        assert_eq!(result.hit_count, 2);
        assert!(result.documents.as_one().is_none());
        assert_eq!(result.documents.iter().count(), 2);
    }

    #[test]
    fn documents_round_trip_untagged() {
        let one = Documents::One(Box::new(json!({"id": "x"})));
        let json = serde_json::to_value(&one).unwrap();
        assert!(json.is_object());
        let back: Documents = serde_json::from_value(json).unwrap();
        assert_eq!(one, back);

        let many = Documents::Many(vec![json!({"id": "x"})]);
        let json = serde_json::to_value(&many).unwrap();
        assert!(json.is_array());
    }
}
