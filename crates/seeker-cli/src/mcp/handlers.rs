//! MCP tool handlers implementation

use std::sync::Arc;

use jiff::Timestamp;
use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use seeker_core::{params as core, ResultSet, RunOutcome, Workflow};
use serde::Deserialize;

use super::errors::to_mcp_error;

/// Generic MCP wrapper for core parameter types with serde integration
///
/// Provides JSON deserialization and schema generation for any parameter
/// type, keeping the core types clean of framework dependencies. The
/// transparent serde attribute passes (de)serialization straight through to
/// the wrapped core type.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type Search = McpParams<core::SearchRequest>;
pub type Resume = McpParams<core::ResumeRequest>;
pub type Thread = McpParams<core::ThreadId>;

pub type McpResult = Result<CallToolResult, ErrorData>;

/// Handler implementations for the MCP server
pub struct McpHandlers {
    workflow: Arc<Workflow>,
}

impl McpHandlers {
    pub fn new(workflow: Arc<Workflow>) -> Self {
        Self { workflow }
    }

    pub async fn search(&self, Parameters(params): Parameters<Search>) -> McpResult {
        debug!("search: {:?}", params);

        let params = params.as_ref();
        let thread_id = params
            .thread_id
            .clone()
            .unwrap_or_else(|| format!("t{}", Timestamp::now().as_millisecond()));

        let outcome = self
            .workflow
            .run(&params.request, &thread_id)
            .await
            .map_err(|e| to_mcp_error("Search failed", &e))?;

        Ok(render_outcome(outcome, &thread_id))
    }

    pub async fn resume(&self, Parameters(params): Parameters<Resume>) -> McpResult {
        debug!("resume: {:?}", params);

        let params = params.as_ref();
        let outcome = self
            .workflow
            .resume(&params.thread_id, params.choice)
            .await
            .map_err(|e| to_mcp_error("Resume failed", &e))?;

        Ok(render_outcome(outcome, &params.thread_id))
    }

    pub async fn show_thread(&self, Parameters(params): Parameters<Thread>) -> McpResult {
        debug!("show_thread: {:?}", params);

        let params = params.as_ref();
        let state = self
            .workflow
            .checkpoint(&params.thread_id)
            .map_err(|e| to_mcp_error("Failed to read thread state", &e))?
            .ok_or_else(|| {
                ErrorData::invalid_params(
                    format!(
                        "No suspended conversation found for thread '{}'",
                        params.thread_id
                    ),
                    None,
                )
            })?;

        Ok(CallToolResult::success(vec![Content::text(
            state.to_string(),
        )]))
    }
}

/// Formats a run outcome as tool output text.
fn render_outcome(outcome: RunOutcome, thread_id: &str) -> CallToolResult {
    match outcome {
        RunOutcome::Complete { documents, .. } => {
            CallToolResult::success(vec![Content::text(ResultSet(&documents).to_string())])
        }
        RunOutcome::NeedsClarification { request } => {
            let text = format!(
                "{request}\nAnswer with the resume tool using thread_id '{thread_id}' and your choice."
            );
            CallToolResult::success(vec![Content::text(text)])
        }
        RunOutcome::Failed { error, .. } => {
            CallToolResult::error(vec![Content::text(error)])
        }
    }
}
