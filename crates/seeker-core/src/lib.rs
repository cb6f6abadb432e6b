//! Core library for the Seeker document search engine.
//!
//! This crate turns natural-language requests about documents and folders
//! into chained structured backend queries. A request is first planned (one
//! query, or a short dependency chain when the request references an entity
//! that must be resolved first), then each step is generated, validated,
//! executed, and classified. Ambiguous intermediate results suspend the run
//! behind a persisted checkpoint until the user picks a candidate.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): plans, step results, execution state, and
//!   clarification requests, all serde-serializable so a run can be
//!   checkpointed as plain JSON
//! - **Collaborators** ([`services`]): the [`services::GenerationService`]
//!   and [`services::SearchBackend`] traits the engine is generic over
//! - **Engine** ([`planner`], [`executor`], [`clarify`], [`workflow`]): the
//!   plan-and-execute loop and its two bounded retry policies
//! - **Persistence** ([`checkpoint`]): suspended-state stores, in-memory and
//!   SQLite
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use seeker_core::{backend::MemoryBackend, RunOutcome, WorkflowBuilder};
//! # use seeker_core::services::{GenerationService, GeneratedQuery, QueryContext};
//! # struct MyGeneration;
//! # impl GenerationService for MyGeneration {
//! #     fn generate_plan(&self, _: &str, _: &[String]) -> seeker_core::Result<serde_json::Value> { unimplemented!() }
//! #     fn generate_query(&self, _: &QueryContext) -> seeker_core::Result<GeneratedQuery> { unimplemented!() }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generation = Arc::new(MyGeneration);
//! let backend = Arc::new(MemoryBackend::new(vec![]));
//!
//! let workflow = WorkflowBuilder::new(generation, backend)
//!     .with_state_db_path(Some("state.db"))
//!     .build()
//!     .await?;
//!
//! match workflow.run("find all W2 documents", "thread-1").await? {
//!     RunOutcome::Complete { documents, .. } => println!("{} hit(s)", documents.len()),
//!     RunOutcome::NeedsClarification { request } => println!("{request}"),
//!     RunOutcome::Failed { error, .. } => eprintln!("{error}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod checkpoint;
pub mod clarify;
pub mod display;
pub mod error;
pub mod executor;
pub mod models;
pub mod params;
pub mod planner;
pub mod query;
pub mod services;
pub mod workflow;

// Re-export commonly used types
pub use backend::MemoryBackend;
pub use checkpoint::{CheckpointStore, MemoryCheckpointStore, SqliteCheckpointStore};
pub use display::{DocumentView, LocalDateTime, ResultSet};
pub use error::{AgentError, Result};
pub use models::{
    ClarificationOption, ClarificationRequest, Documents, ExecutionState, Plan, PlanKind, Step,
    StepResult,
};
pub use params::{ResumeRequest, SearchRequest, ThreadId};
pub use services::{GeneratedQuery, GenerationService, SearchBackend, SearchResponse};
pub use workflow::{RunOutcome, Workflow, WorkflowBuilder};
