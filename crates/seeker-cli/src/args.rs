use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main command-line interface for the Seeker document search tool
///
/// Seeker answers natural-language questions about documents and folders by
/// translating them into chained structured queries against a search
/// backend. Ambiguous requests pause for clarification and can be resumed
/// later, so every invocation addresses a conversation thread. The tool can
/// also run as an MCP (Model Context Protocol) server for integration with
/// AI assistants.
#[derive(Parser)]
#[command(version, about, name = "sk")]
pub struct Args {
    /// Path to the SQLite state database file. Defaults to
    /// $XDG_DATA_HOME/seeker/state.db
    #[arg(long, global = true)]
    pub state_db: Option<PathBuf>,

    /// Path to a JSON file with the document corpus to search. Defaults to
    /// a built-in demo corpus
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Seeker CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Answer a natural-language search request
    #[command(alias = "q")]
    Search {
        /// The request to answer
        request: String,

        /// Thread id for the conversation; generated when omitted
        #[arg(long)]
        thread: Option<String>,
    },
    /// Answer a pending clarification on a suspended thread
    Resume {
        /// Thread id of the suspended conversation
        #[arg(long)]
        thread: String,

        /// 1-indexed choice among the offered options
        choice: u32,
    },
    /// Show the persisted state of a suspended thread
    Show {
        /// Thread id of the conversation to inspect
        #[arg(long)]
        thread: String,
    },
    /// Start the MCP server
    Serve,
}
