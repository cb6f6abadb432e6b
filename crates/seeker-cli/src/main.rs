//! Seeker CLI Application
//!
//! Command-line interface for the Seeker document search engine.

mod args;
mod cli;
mod mcp;
mod renderer;
mod rules;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, SeekerMcpServer};
use renderer::TerminalRenderer;
use rules::{sample_corpus, RuleBasedGeneration};
use seeker_core::{
    params::{ResumeRequest, SearchRequest, ThreadId},
    MemoryBackend, WorkflowBuilder,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        state_db,
        corpus,
        no_color,
        command,
    } = Args::parse();

    let backend = match corpus {
        Some(path) => MemoryBackend::from_file(&path)
            .with_context(|| format!("Failed to load corpus from {}", path.display()))?,
        None => MemoryBackend::new(sample_corpus()),
    };

    let workflow = WorkflowBuilder::new(Arc::new(RuleBasedGeneration), Arc::new(backend))
        .with_state_db_path(state_db)
        .build()
        .await
        .context("Failed to initialize workflow")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Seeker started");

    match command {
        Commands::Search { request, thread } => {
            Cli::new(workflow, renderer)
                .search(SearchRequest {
                    request,
                    thread_id: thread,
                })
                .await
        }
        Commands::Resume { thread, choice } => {
            Cli::new(workflow, renderer)
                .resume(ResumeRequest {
                    thread_id: thread,
                    choice,
                })
                .await
        }
        Commands::Show { thread } => {
            Cli::new(workflow, renderer)
                .show(ThreadId { thread_id: thread })
                .await
        }
        Commands::Serve => {
            info!("Starting Seeker MCP server");
            run_stdio_server(SeekerMcpServer::new(workflow))
                .await
                .context("MCP server failed")
        }
    }
}
