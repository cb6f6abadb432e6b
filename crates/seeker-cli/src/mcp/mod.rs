//! MCP server implementation for Seeker
//!
//! This module implements the Model Context Protocol server for Seeker,
//! providing a standardized interface for AI models to run document
//! searches, answer clarifications, and inspect suspended threads.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use seeker_core::Workflow;
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

// Re-export parameter types and result type from handlers for external use
pub use handlers::{McpResult, Resume, Search, Thread};

/// MCP server for Seeker
#[derive(Clone)]
pub struct SeekerMcpServer {
    workflow: Arc<Workflow>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SeekerMcpServer {
    /// Create a new Seeker MCP server
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "search",
        description = "Answer a natural-language request about documents and folders. Provide the request text and optionally a thread_id to name the conversation (one is generated otherwise). Returns the matching documents, or a numbered clarification question when the request is ambiguous - answer it with the resume tool and the same thread_id."
    )]
    async fn search(&self, params: Parameters<Search>) -> McpResult {
        let handlers = handlers::McpHandlers::new(self.workflow.clone());
        handlers.search(params).await
    }

    #[tool(
        name = "resume",
        description = "Answer a pending clarification on a suspended search thread. Provide the thread_id returned by the search tool and the 1-indexed choice among the offered options. Out-of-range choices are rejected and the thread stays suspended, so the question can be answered again."
    )]
    async fn resume(&self, params: Parameters<Resume>) -> McpResult {
        let handlers = handlers::McpHandlers::new(self.workflow.clone());
        handlers.resume(params).await
    }

    #[tool(
        name = "show_thread",
        description = "Display the persisted state of a suspended search thread: the original request, the plan, the current step, and the pending clarification question. Useful for recovering context before answering a clarification."
    )]
    async fn show_thread(&self, params: Parameters<Thread>) -> McpResult {
        let handlers = handlers::McpHandlers::new(self.workflow.clone());
        handlers.show_thread(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SeekerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "seeker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"Seeker answers natural-language questions about documents and folders by translating them into structured backend queries, chaining lookups when a request references an entity that must be resolved first.

## Workflow
1. Call `search` with the request text. Most requests complete in one call.
2. If the request is ambiguous (for example two folders share the referenced name), the response is a numbered question and the conversation suspends under its thread_id.
3. Answer with `resume`, passing the thread_id and the chosen option number. The search then continues from where it paused.
4. Use `show_thread` to re-read a suspended conversation before answering.

## Notes
- Pass your own thread_id to `search` when you want to correlate calls; otherwise one is generated and included in the clarification prompt.
- An empty result set on a completed search is a valid answer, not an error.
"#
                .to_string(),
            ),
        }
    }
}

/// Run the MCP server on stdio until the peer disconnects or a signal
/// arrives.
pub async fn run_stdio_server(server: SeekerMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Seeker MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    Ok(())
}
