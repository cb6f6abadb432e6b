//! Clarification request model for ambiguous intermediate results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single candidate the user may pick to disambiguate a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationOption {
    /// Option number presented to the user (1-indexed)
    pub ordinal: u32,

    /// User-friendly display label for the candidate
    pub label: String,

    /// The full backend record this option stands for
    pub value: Value,
}

/// Multiple-choice question raised when an intermediate step matched more
/// than one candidate and the engine cannot pick one automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationRequest {
    /// Which step is waiting on the answer
    pub step_index: u32,

    /// Question to ask the user
    pub prompt: String,

    /// The candidates, in backend order
    pub options: Vec<ClarificationOption>,

    /// The query that produced the candidates, kept so the resumed step's
    /// result stays traceable
    pub query: Value,
}

impl ClarificationRequest {
    /// Looks up an option by its 1-indexed ordinal.
    pub fn option(&self, ordinal: u32) -> Option<&ClarificationOption> {
        self.options.iter().find(|o| o.ordinal == ordinal)
    }
}
