//! Parameter structures shared across interfaces.
//!
//! These structs carry operation inputs between interface layers (CLI, MCP)
//! and the core engine without framework-specific derives. Interface layers
//! wrap them with their own derives and convert via `.into()` or transparent
//! serialization; the optional `schema` feature adds `JsonSchema` for
//! interfaces that publish tool schemas.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for answering a natural-language search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SearchRequest {
    /// The natural-language request to answer
    pub request: String,
    /// Conversation thread id; generated when omitted
    pub thread_id: Option<String>,
}

/// Parameters for resuming a suspended thread with a clarification answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ResumeRequest {
    /// Thread id of the suspended conversation
    pub thread_id: String,
    /// 1-indexed choice among the offered options
    pub choice: u32,
}

/// Generic parameters for operations addressing a single thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ThreadId {
    /// Thread id of the conversation to inspect
    pub thread_id: String,
}
