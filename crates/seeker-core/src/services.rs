//! Collaborator interfaces the engine is built against.
//!
//! The query generation service and the search backend are external
//! systems. They are injected into the planner and executor as trait
//! objects so tests can substitute deterministic doubles, instead of the
//! process-wide singletons a typical agent framework would reach for.
//!
//! Both traits are blocking from the executor's point of view; the only
//! scheduled delay in the engine is the execution-retry backoff.

use std::fmt;

use serde_json::Value;

use crate::{error::Result, models::StepResult};

/// Context handed to the generation service for one step's query.
#[derive(Debug)]
pub struct QueryContext<'a> {
    /// Natural language goal for the step
    pub step_description: &'a str,

    /// The original request, for traceability
    pub original_request: &'a str,

    /// Step being generated (1-indexed)
    pub current_step: u32,

    /// Total steps in the plan
    pub total_steps: u32,

    /// The referenced step's result when `depends_on` is set, so concrete
    /// values can be extracted from it
    pub prior_result: Option<&'a StepResult>,

    /// Structural errors from the previous attempt, if regenerating
    pub feedback: &'a [String],
}

/// Domain errors the generation service may report instead of a query.
/// These are fatal immediately: retrying the same malformed input is
/// expected to reproduce the same refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalKind {
    /// The request is inherently ambiguous
    AmbiguousRequest,

    /// The request references a field the query vocabulary lacks
    UnsupportedField,
}

impl fmt::Display for RefusalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalKind::AmbiguousRequest => write!(f, "ambiguous_request"),
            RefusalKind::UnsupportedField => write!(f, "unsupported_field"),
        }
    }
}

/// Outcome of a query generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedQuery {
    /// A structured, backend-evaluable query object
    Query(Value),

    /// An explicit domain error from the service
    Refused { kind: RefusalKind, message: String },
}

/// Natural-language-to-structured-query synthesis service.
pub trait GenerationService: Send + Sync {
    /// Produces a candidate plan as raw JSON for the given request.
    /// `feedback` carries the validation errors of the previous candidate
    /// so the service can correct them.
    fn generate_plan(&self, request: &str, feedback: &[String]) -> Result<Value>;

    /// Produces a structured query for one step, or an explicit refusal.
    fn generate_query(&self, ctx: &QueryContext<'_>) -> Result<GeneratedQuery>;
}

/// What the search backend returned for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Total number of matching records
    pub hit_count: u64,

    /// The matching records, in backend order
    pub documents: Vec<Value>,
}

/// Query evaluation engine over the indexed document store.
pub trait SearchBackend: Send + Sync {
    /// Evaluates a structured query and returns the matching records.
    /// Transient failures surface as [`crate::AgentError::Backend`].
    fn search(&self, query: &Value) -> Result<SearchResponse>;
}
