//! Error handling utilities for MCP server

use rmcp::ErrorData;
use seeker_core::AgentError;

/// Helper to convert engine errors to MCP errors
pub fn to_mcp_error(message: &str, error: &AgentError) -> ErrorData {
    match error {
        AgentError::ThreadNotFound { .. }
        | AgentError::NoPendingClarification { .. }
        | AgentError::InvalidSelection { .. }
        | AgentError::InvalidInput { .. } => {
            ErrorData::invalid_params(format!("{}: {}", message, error), None)
        }
        _ => ErrorData::internal_error(format!("{}: {}", message, error), None),
    }
}
